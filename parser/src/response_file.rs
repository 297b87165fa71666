//! `@file` expansion.
//!
//! A response file holds further input, one or more tokens per line, split
//! with the same quoting rules as a command-line string. Blank lines and
//! lines starting with `#` are skipped. Nested references resolve relative
//! to the file that contains them.

use std::fs;
use std::path::{Path, PathBuf};

use command_line_core::ParserConfig;
use tracing::debug;

use crate::error::{ParseError, ParseErrorKind};
use crate::tokenizer::{Piece, split_command_line};

pub(crate) struct Expander<'c> {
    config: &'c ParserConfig,
    stack: Vec<PathBuf>,
    after_double_dash: bool,
    pub(crate) pieces: Vec<Piece>,
    pub(crate) errors: Vec<ParseError>,
}

impl<'c> Expander<'c> {
    pub(crate) fn new(config: &'c ParserConfig) -> Self {
        Self {
            config,
            stack: Vec::new(),
            after_double_dash: false,
            pieces: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Appends `piece`, expanding it if it references a response file.
    pub(crate) fn push(&mut self, piece: Piece, base: Option<&Path>, depth: usize) {
        match &piece {
            Piece::Text(text) if text == "--" => self.after_double_dash = true,
            Piece::Text(text) if self.is_reference(text) => {
                let text = text.clone();
                self.expand(&text, base, depth + 1);
                return;
            }
            _ => {}
        }
        self.pieces.push(piece);
    }

    fn is_reference(&self, text: &str) -> bool {
        self.config.response_files
            && !self.after_double_dash
            && text.len() > 1
            && text.starts_with('@')
    }

    fn fail(&mut self, reference: &str, message: String) {
        debug!(reference, %message, "response file not expanded");
        self.errors
            .push(ParseError::new(ParseErrorKind::ResponseFile, message));
        self.pieces.push(Piece::ResponseFile(reference.to_string()));
    }

    fn expand(&mut self, reference: &str, base: Option<&Path>, depth: usize) {
        let raw = &reference[1..];
        let path = match base {
            Some(dir) => dir.join(raw),
            None => PathBuf::from(raw),
        };

        let max = self.config.max_response_file_depth;
        if depth > max {
            return self.fail(
                reference,
                format!("Response file '{raw}' exceeds the maximum nesting depth of {max}."),
            );
        }

        let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if self.stack.contains(&key) {
            return self.fail(reference, format!("Response file '{raw}' includes itself."));
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                let message = format!("Could not read response file '{raw}': {err}");
                return self.fail(reference, message);
            }
        };
        debug!(path = %path.display(), depth, "expanding response file");

        let dir = path.parent().map(Path::to_path_buf);
        self.stack.push(key);
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let split = split_command_line(line);
            for part in split.parts {
                self.push(Piece::Text(part), dir.as_deref(), depth);
            }
            if let Some(rest) = split.unterminated {
                self.errors.push(ParseError::quote(&rest));
                self.pieces.push(Piece::Unparsed(rest));
            }
        }
        self.stack.pop();
    }
}
