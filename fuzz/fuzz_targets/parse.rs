#![no_main]

use libfuzzer_sys::fuzz_target;
use tagscript::lexer::{Mode, lex};
use tagscript::{BuiltinComponents, Dialect, Flavor, ParserConfig, SourceType, parser};

const DIALECTS: [Dialect; 4] = [Dialect::Script, Dialect::Template, Dialect::Query, Dialect::Doc];

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        for flavor in [Flavor::Box, Flavor::Cf] {
            // The lexer on its own must terminate in every resting mode
            for mode in [Mode::Script, Mode::Template, Mode::Query] {
                let _ = lex(s, mode, flavor);
            }
            for dialect in DIALECTS {
                let config = ParserConfig::new(SourceType::new(dialect, flavor));
                let _ = parser::parse(s, &config, &BuiltinComponents);
            }
        }
    }
});
