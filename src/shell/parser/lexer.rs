use std::str::SplitWhitespace;

use super::ast::ControlOp;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token {
    Word(String),
    Op(ControlOp),
    /// `#` 开头的词，行的剩余部分全部丢弃
    Comment,
    Eof,
}

/// 按空白切词，不支持引号和转义。
/// 词的最后一个字符若是 `;`、`&`、`|`，剥离成独立的操作符 token；
/// 剥离后剩下的非空部分先作为普通词产出。
pub struct Lexer<'a> {
    words: SplitWhitespace<'a>,
    pending_op: Option<ControlOp>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            words: input.split_whitespace(),
            pending_op: None,
        }
    }

    pub fn next_token(&mut self) -> Token {
        if let Some(op) = self.pending_op.take() {
            return Token::Op(op);
        }

        let word = match self.words.next() {
            Some(word) => word,
            None => return Token::Eof,
        };

        if word.starts_with('#') {
            return Token::Comment;
        }

        // split_whitespace 不会产出空词
        let last = match word.chars().last() {
            Some(c) => c,
            None => return Token::Eof,
        };

        if let Some(op) = ControlOp::from_char(last) {
            let rest = &word[..word.len() - last.len_utf8()];
            if rest.is_empty() {
                return Token::Op(op);
            }
            self.pending_op = Some(op);
            return Token::Word(rest.to_string());
        }

        Token::Word(word.to_string())
    }
}
