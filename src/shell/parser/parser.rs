use super::ast::{ControlOp, Segment};
use super::lexer::{Lexer, Token};

/// 把一行文本切成按出现顺序排列的命令段序列
pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    pub fn parse(&mut self) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut current = Segment::default();

        loop {
            match self.lexer.next_token() {
                Token::Word(word) => current.argv.push(word),
                Token::Op(op) => {
                    // 操作符收尾当前命令段，即使命令为空也照常产出
                    current.op = op;
                    segments.push(std::mem::take(&mut current));
                }
                Token::Comment => {
                    // 注释截断整行，已累积的词作为无操作符的末段产出
                    if !current.argv.is_empty() {
                        current.op = ControlOp::None;
                        segments.push(current);
                    }
                    return segments;
                }
                Token::Eof => {
                    if !current.argv.is_empty() {
                        segments.push(current);
                    }
                    return segments;
                }
            }
        }
    }
}
