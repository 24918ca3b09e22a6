//! Scope keys for component styles.
//!
//! A [`ScopedCss`] marker interpolated into an attribute position tells the
//! renderer to tag every element of that component with the marker's key as a
//! class name. The key is derived from the CSS token stream, so formatting and
//! comments do not change it.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use cssparser::{ParseError, Parser, ParserInput, ToCss, Token};
use tracing::trace;

pub const KEY_PREFIX: &str = "weave-";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopedCss {
    key: Rc<str>,
    source: Rc<str>,
}

impl ScopedCss {
    /// Class name shared by every element the owning component renders.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for ScopedCss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Build a scope marker for a style source.
pub fn css(source: &str) -> ScopedCss {
    let mut hasher = DefaultHasher::new();
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);
    let mut tokens = 0usize;
    // Only end-of-input ends the walk; malformed CSS still hashes as tokens.
    let _ = feed(&mut parser, &mut hasher, &mut tokens);
    let key = format!("{KEY_PREFIX}{:016x}", hasher.finish());
    trace!(%key, tokens, "derived style scope key");
    ScopedCss {
        key: key.into(),
        source: source.into(),
    }
}

fn feed<'i>(
    parser: &mut Parser<'i, '_>,
    hasher: &mut DefaultHasher,
    tokens: &mut usize,
) -> Result<(), ParseError<'i, ()>> {
    loop {
        let token = match parser.next() {
            Ok(t) => t.clone(),
            Err(_) => return Ok(()),
        };
        token.to_css_string().hash(hasher);
        *tokens += 1;
        if matches!(
            token,
            Token::Function(_)
                | Token::ParenthesisBlock
                | Token::SquareBracketBlock
                | Token::CurlyBracketBlock
        ) {
            parser.parse_nested_block(|nested| feed(nested, hasher, tokens))?;
            // Close the block so `a{b}c` and `a{bc}` differ.
            0xffu8.hash(hasher);
        }
    }
}
