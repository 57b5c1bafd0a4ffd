//! Shareable metadata for `tagscript_core::lang` registries.
//!
//! Every vocabulary (keywords, operators, punctuation, ...) is a const table of `*Info` records. This submodule
//! holds the small, dependency-free metadata types those tables share.
//!
//! ## Notes
//! - These types are `Copy` so registries can live in `const` tables.
//! - Metadata is for tooling and diagnostics; enforcement of syntax rules lives in the lexer/parser.

/// The two concrete spellings of the script and template dialects.
///
/// They differ in the tag prefix (`<bx:if>` vs `<cfif>`) and in a handful of lexical heuristics. Everything after
/// parsing is flavor-neutral.
///
/// ## Examples
/// ```rust
/// use tagscript_core::Flavor;
///
/// assert_eq!(Flavor::Cf.tag_prefix(), "cf");
/// assert_eq!(Flavor::Box.tag_prefix(), "bx:");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flavor {
    #[default]
    Box,
    Cf,
}

impl Flavor {
    /// The prefix glued to tag names in the template dialect.
    pub const fn tag_prefix(self) -> &'static str {
        match self {
            Flavor::Box => "bx:",
            Flavor::Cf => "cf",
        }
    }

    /// Human-readable name used by diagnostics and the CLI.
    pub const fn name(self) -> &'static str {
        match self {
            Flavor::Box => "box",
            Flavor::Cf => "cf",
        }
    }

    /// The variable that names the caught exception when a template `catch` tag does not declare one.
    pub const fn default_catch_variable(self) -> &'static str {
        match self {
            Flavor::Box => "bxcatch",
            Flavor::Cf => "cfcatch",
        }
    }
}

/// Which flavors accept a vocabulary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    Both,
    BoxOnly,
    CfOnly,
}

impl Availability {
    /// Whether the item is part of `flavor`'s vocabulary.
    pub const fn allows(self, flavor: Flavor) -> bool {
        matches!(
            (self, flavor),
            (Availability::Both, _) | (Availability::BoxOnly, Flavor::Box) | (Availability::CfOnly, Flavor::Cf)
        )
    }
}

/// Describe the lifecycle status of a language vocabulary item.
///
/// ## Examples
/// ```rust
/// use tagscript_core::lang::registry::Stability;
///
/// let s = Stability::Stable;
/// assert_eq!(format!("{s:?}"), "Stable");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stability {
    Stable,
    Deprecated,
}

/// Represent a small example snippet for documentation.
///
/// ## Notes
/// - `code` is the example body, in script or template syntax.
/// - `note` is an optional short explanation.
#[derive(Debug, Clone, Copy)]
pub struct Example {
    pub code: &'static str,
    pub note: Option<&'static str>,
}
