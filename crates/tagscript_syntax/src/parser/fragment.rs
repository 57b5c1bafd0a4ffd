/// Fragment parsing.
///
/// Script islands, re-parsed attribute expressions and doc comments are parsed by a fresh [`Parser`] over the
/// fragment text. The fragment shares the source, registry and configuration of its parent and starts at the
/// fragment's document position, so every position it produces is already in document coordinates.
///
/// ## Notes
/// - Fragment parsers skip the whole-tree rewrite and comment association; the outermost parse runs both once.
/// - Hitting the nesting limit inside a fragment aborts the parent as well.
/// - Byte spans inside a fragment's nodes are relative to the fragment text.
impl<'a> Parser<'a> {
    /// Parse `text` (starting at document point `start`) from `entry`, merging issues and comments into this parser.
    fn parse_fragment(&mut self, text: &str, start: Point, entry: EntryPoint) -> Option<AstNode> {
        if self.aborted {
            return None;
        }
        if self.depth >= self.config.max_depth {
            self.depth_exceeded();
            return None;
        }
        tracing::debug!(?entry, %start, depth = self.depth + 1, "parsing fragment");
        let sub = Parser::with_context(
            text,
            entry,
            self.source.clone(),
            self.registry,
            self.config,
            Offset::at(start),
            self.depth + 1,
            true,
        );
        match sub.parse() {
            Ok(result) => {
                let limit = messages::max_depth(self.config.max_depth, Position::at(start, self.source.clone())).message;
                for issue in result.issues {
                    let exceeded = issue.message == limit;
                    self.report(issue);
                    // The nesting limit abandons the whole parse, not only the fragment.
                    if exceeded {
                        self.aborted = true;
                    }
                }
                self.comments.extend(result.comments);
                result.root
            }
            Err(err) => {
                self.internal.get_or_insert(err.to_string());
                None
            }
        }
    }
}
