//! Lex a GPR string into a series of tokens for later parsing

use std::borrow::Borrow;

use thiserror::Error;

use crate::io::gpr_parse::token::Token;

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token>, LexerError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }
        self.tokens.push(Token::Eof);
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), LexerError> {
        let c: char = self.advance();
        match c {
            // Single Character Tokens
            '(' => self.add_token(Token::LeftParen),
            ')' => self.add_token(Token::RightParen),
            // Identifiers and Operators. Locus tags can start with a digit.
            c if Lexer::is_identifier_char(c) => self.read_identifier(),
            // Whitespace
            ' ' | '\r' | '\n' | '\t' => {}
            _ => return Err(LexerError::InvalidCharacter(c)),
        };
        Ok(())
    }

    fn advance(&mut self) -> char {
        let char_at_current = self.source[self.current];
        self.current += 1;
        char_at_current
    }

    fn read_identifier(&mut self) {
        while Lexer::is_identifier_char(self.peek()) {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();

        match text.borrow() {
            "and" | "And" | "AND" => self.add_token(Token::And),
            "or" | "Or" | "OR" => self.add_token(Token::Or),
            gene => self.add_token(Token::Identifier(gene.to_string())),
        }
    }

    fn is_identifier_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            return '\0';
        }
        self.source[self.current]
    }

    fn add_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

#[derive(Debug, Error)]
pub enum LexerError {
    #[error("Invalid character '{0}' in GPR string")]
    InvalidCharacter(char),
}

#[cfg(test)]
mod tests {
    use crate::io::gpr_parse::lexer::Lexer;
    use crate::io::gpr_parse::token::Token;

    #[test]
    fn single_gene() {
        let lexer = Lexer::new("CLO1313_RS00050");
        let tokens = lexer.scan_tokens().unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(
            tokens[0],
            Token::Identifier(String::from("CLO1313_RS00050"))
        );
    }

    #[test]
    fn grouping() {
        let lexer = Lexer::new("(Clo1313_0966 or Clo1313_1798)");
        let tokens = lexer.scan_tokens().unwrap();
        let expected = vec![
            Token::LeftParen,
            Token::Identifier(String::from("Clo1313_0966")),
            Token::Or,
            Token::Identifier(String::from("Clo1313_1798")),
            Token::RightParen,
            Token::Eof,
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn invalid_character() {
        let lexer = Lexer::new("gene1 & gene2");
        assert!(lexer.scan_tokens().is_err());
    }
}
