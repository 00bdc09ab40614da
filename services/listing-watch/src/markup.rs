//! Minimal markup queries used by page validation
//!
//! Answers "does this document open a `<tag>` element" from the token stream
//! rather than a parsed tree, because the tree builder synthesizes `<html>`
//! and `<body>` for any input. Text inside comments, attribute values and
//! raw-text elements such as `<script>` or `<title>` never yields a tag.

use std::collections::HashSet;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

/// Start tags seen in a document, lowercased
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StartTags {
    names: HashSet<String>,
}

impl StartTags {
    /// Tokenize `markup` and collect the name of every start tag
    pub fn scan(markup: &str) -> Self {
        let mut input = BufferQueue::new();
        input.push_back(StrTendril::from_slice(markup));

        let mut tokenizer = Tokenizer::new(StartTagSink::default(), TokenizerOpts::default());
        let _ = tokenizer.feed(&mut input);
        tokenizer.end();

        Self {
            names: tokenizer.sink.names,
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.names.contains(&tag.to_ascii_lowercase())
    }
}

/// Whether `markup` contains an opening tag named `tag` (case-insensitive)
pub fn has_element(markup: &str, tag: &str) -> bool {
    StartTags::scan(markup).contains(tag)
}

#[derive(Default)]
struct StartTagSink {
    names: HashSet<String>,
}

impl TokenSink for StartTagSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let Token::TagToken(tag) = token else {
            return TokenSinkResult::Continue;
        };
        if tag.kind != TagKind::StartTag {
            return TokenSinkResult::Continue;
        }

        let name: &str = &tag.name;
        self.names.insert(name.to_string());

        // Without a tree builder the tokenizer has to be told which elements
        // hold raw text, otherwise their content is scanned for tags.
        if tag.self_closing {
            return TokenSinkResult::Continue;
        }
        match name {
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
                TokenSinkResult::RawData(RawKind::Rawtext)
            }
            "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
            "plaintext" => TokenSinkResult::Plaintext,
            _ => TokenSinkResult::Continue,
        }
    }
}
