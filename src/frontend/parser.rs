//! Parser for MiniBasic
//!
//! Recursive descent with one token of lookahead. Every recognized
//! construct is emitted immediately; no token or partial tree outlives
//! the statement being parsed.

use std::collections::HashSet;
use std::mem;

use log::trace;

use crate::backend::GoEmitter;
use crate::frontend::scanner::Scanner;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result, Span};

/// The parser; owns the scanner and the emitter for one translation
pub struct Parser {
    scanner: Scanner,
    emitter: GoEmitter,
    cur: Token,
    peek: Token,

    /// Variables declared via LET or INPUT
    symbols: HashSet<String>,
    /// Declared label names; a duplicate is fatal at its declaration
    labels: HashSet<String>,
    /// Referenced goto targets with the site of the first reference,
    /// in recording order; resolved once after the whole program
    gotos: Vec<(String, Span)>,
}

impl Parser {
    /// Create a new parser over a scanner and a fresh emitter
    pub fn new(scanner: Scanner, emitter: GoEmitter) -> Self {
        Self {
            scanner,
            emitter,
            cur: Token::eof(Span::dummy()),
            peek: Token::eof(Span::dummy()),
            symbols: HashSet::new(),
            labels: HashSet::new(),
            gotos: Vec::new(),
        }
    }

    // ==================== Helper Methods ====================

    /// Pull the next token; cur and peek move in lockstep
    fn advance(&mut self) -> Result<()> {
        let next = self.scanner.next_token()?;
        self.cur = mem::replace(&mut self.peek, next);
        Ok(())
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    /// Consume the current token if it has the expected kind, fail
    /// immediately otherwise
    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.cur.kind != kind {
            return Err(Error::UnexpectedToken {
                expected: kind.describe().to_string(),
                got: self.cur.kind.describe().to_string(),
                span: self.cur.span,
            });
        }
        let token = self.cur.clone();
        self.advance()?;
        Ok(token)
    }

    /// Emit the statement terminator and consume the newline run
    fn end_of_line(&mut self) -> Result<()> {
        self.emitter.emit("\n");
        self.expect(TokenKind::Newline)?;
        while self.check(TokenKind::Newline) {
            self.advance()?;
        }
        Ok(())
    }

    // ==================== Parsing Methods ====================

    /// Parse the whole program and hand back the emitter for finalize
    pub fn parse(mut self) -> Result<GoEmitter> {
        // Prime cur and peek
        self.advance()?;
        self.advance()?;

        self.emitter.emit("func main() {\n");

        while !self.check(TokenKind::Eof) {
            self.statement()?;
        }

        // Goto targets are the one check deferred past its statement;
        // the first recorded miss wins
        for (name, span) in &self.gotos {
            if !self.labels.contains(name) {
                return Err(Error::UndefinedLabel {
                    name: name.clone(),
                    span: *span,
                });
            }
        }

        self.emitter.emit("}");
        Ok(self.emitter)
    }

    fn statement(&mut self) -> Result<()> {
        trace!("statement: cur={:?} peek={:?}", self.cur.kind, self.peek.kind);

        match self.cur.kind {
            // 'PRINT' (string | expression) (',' (string | expression))* nl
            TokenKind::Print => {
                self.emitter.require_import("fmt");
                self.emitter.emit("fmt.Println(");
                self.advance()?;

                while !self.check(TokenKind::Newline) {
                    match self.cur.kind {
                        TokenKind::StringLit => {
                            self.emitter.emit(&format!("\"{}\"", self.cur.text));
                            self.advance()?;
                        }
                        TokenKind::Comma => {
                            self.emitter.emit(",");
                            self.advance()?;
                        }
                        _ => self.expression()?,
                    }
                }
                self.emitter.emit(")");
            }

            // 'IF' comparison 'THEN' nl statement* 'ENDIF' nl
            TokenKind::If => {
                self.emitter.emit("if ");
                self.advance()?;
                self.comparison()?;

                self.emitter.emit(" {");
                self.expect(TokenKind::Then)?;
                self.end_of_line()?;

                while !self.check(TokenKind::EndIf) {
                    self.statement()?;
                }
                self.emitter.emit("}");
                self.expect(TokenKind::EndIf)?;
            }

            // 'WHILE' comparison 'REPEAT' nl statement* 'ENDWHILE' nl
            TokenKind::While => {
                self.emitter.emit("for ");
                self.advance()?;
                self.comparison()?;

                self.emitter.emit(" {\n");
                self.expect(TokenKind::Repeat)?;
                self.end_of_line()?;

                while !self.check(TokenKind::EndWhile) {
                    self.statement()?;
                }
                self.emitter.emit("}");
                self.expect(TokenKind::EndWhile)?;
            }

            // 'LABEL' identifier nl
            TokenKind::Label => {
                self.advance()?;
                let name = self.expect(TokenKind::Ident)?;
                if !self.labels.insert(name.text.clone()) {
                    return Err(Error::DuplicateLabel {
                        name: name.text,
                        span: name.span,
                    });
                }
                self.emitter.emit(&name.text);
                self.emitter.emit(":");
            }

            // 'GOTO' identifier nl; the target may be declared later
            TokenKind::Goto => {
                self.advance()?;
                let name = self.expect(TokenKind::Ident)?;
                self.emitter.emit("goto ");
                self.emitter.emit(&name.text);
                if !self.gotos.iter().any(|(n, _)| n == &name.text) {
                    self.gotos.push((name.text, name.span));
                }
            }

            // 'INPUT' identifier nl; first mention declares and zeroes
            TokenKind::Input => {
                self.emitter.require_import("fmt");
                self.advance()?;
                let name = self.expect(TokenKind::Ident)?;
                if self.symbols.insert(name.text.clone()) {
                    self.emitter.emit(&format!("var {} = \"\"\n", name.text));
                }
                self.emitter.emit(&format!("fmt.Scanln(&{})", name.text));
            }

            // 'LET' identifier '=' expression nl
            TokenKind::Let => {
                self.advance()?;
                let name = self.expect(TokenKind::Ident)?;
                self.symbols.insert(name.text.clone());
                self.emitter.emit(&format!("var {}", name.text));
                self.expect(TokenKind::Eq)?;
                self.emitter.emit(" = ");
                self.expression()?;
            }

            // identifier '=' (string | expression) nl
            // Plain assignment skips the symbol table on both sides; a
            // later read of the name still has to come from LET or INPUT
            TokenKind::Ident => {
                let name = self.expect(TokenKind::Ident)?;
                self.emitter.emit(&name.text);
                self.emitter.emit(" = ");
                self.expect(TokenKind::Eq)?;

                while !self.check(TokenKind::Newline) {
                    if self.check(TokenKind::StringLit) {
                        self.emitter.emit(&format!("\"{}\"", self.cur.text));
                        self.advance()?;
                    } else {
                        self.expression()?;
                    }
                }
            }

            other => {
                return Err(Error::UnexpectedStatement {
                    got: other.describe().to_string(),
                    span: self.cur.span,
                });
            }
        }

        self.end_of_line()
    }

    /// comparison := expression comparisonOp expression
    ///               (comparisonOp expression)*
    ///
    /// At least one comparison operator is required; further ones
    /// chain left to right with no precedence among them.
    fn comparison(&mut self) -> Result<()> {
        self.expression()?;

        if !self.cur.kind.is_comparison_op() {
            return Err(Error::ExpectedComparison {
                got: self.cur.kind.describe().to_string(),
                span: self.cur.span,
            });
        }
        while self.cur.kind.is_comparison_op() {
            self.emitter.emit(&self.cur.text);
            self.advance()?;
            self.expression()?;
        }
        Ok(())
    }

    /// expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<()> {
        self.term()?;
        while self.check(TokenKind::Plus) || self.check(TokenKind::Minus) {
            self.emitter.emit(&self.cur.text);
            self.advance()?;
            self.term()?;
        }
        Ok(())
    }

    /// term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<()> {
        self.unary()?;
        while self.check(TokenKind::Star) || self.check(TokenKind::Slash) {
            self.emitter.emit(&self.cur.text);
            self.advance()?;
            self.unary()?;
        }
        Ok(())
    }

    /// unary := ('+' | '-')? primary
    fn unary(&mut self) -> Result<()> {
        if self.check(TokenKind::Plus) || self.check(TokenKind::Minus) {
            self.emitter.emit(&self.cur.text);
            self.advance()?;
        }
        self.primary()
    }

    /// primary := number | identifier
    ///
    /// An identifier read here must already be declared.
    fn primary(&mut self) -> Result<()> {
        match self.cur.kind {
            TokenKind::Number => {
                self.emitter.emit(&self.cur.text);
                self.advance()
            }
            TokenKind::Ident => {
                if !self.symbols.contains(&self.cur.text) {
                    return Err(Error::UndeclaredVariable {
                        name: self.cur.text.clone(),
                        span: self.cur.span,
                    });
                }
                self.emitter.emit(&self.cur.text);
                self.advance()
            }
            other => Err(Error::ExpectedExpression {
                got: other.describe().to_string(),
                span: self.cur.span,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn translate(source: &str) -> Result<String> {
        let parser = Parser::new(Scanner::new(source), GoEmitter::new());
        Ok(parser.parse()?.finalize())
    }

    #[test]
    fn test_print_string_and_expression() {
        let output = translate("PRINT \"a\", 1+2\n").expect("translate failed");
        assert_eq!(
            output,
            "package main\n\nimport (\n\t\"fmt\"\n)\n\nfunc main() {\nfmt.Println(\"a\",1+2)\n}"
        );
    }

    #[test]
    fn test_fmt_imported_once() {
        let output =
            translate("PRINT \"a\"\nPRINT \"b\"\nINPUT x\n").expect("translate failed");
        assert_eq!(output.matches("\"fmt\"").count(), 1);
    }

    #[test]
    fn test_let_then_print() {
        let output = translate("LET x = 5\nPRINT x\n").expect("translate failed");
        assert_eq!(
            output,
            "package main\n\nimport (\n\t\"fmt\"\n)\n\nfunc main() {\nvar x = 5\nfmt.Println(x)\n}"
        );
    }

    #[test]
    fn test_if_block() {
        let output = translate("IF 1 == 1 THEN\nPRINT \"x\"\nENDIF\n").expect("translate failed");
        assert_eq!(
            output,
            "package main\n\nimport (\n\t\"fmt\"\n)\n\nfunc main() {\nif 1==1 {\nfmt.Println(\"x\")\n}\n}"
        );
    }

    #[test]
    fn test_while_block() {
        let output = translate("LET x = 3\nWHILE x > 0 REPEAT\nLET x = x - 1\nENDWHILE\n")
            .expect("translate failed");
        assert_eq!(
            output,
            "package main\n\nfunc main() {\nvar x = 3\nfor x>0 {\n\nvar x = x-1\n}\n}"
        );
    }

    #[test]
    fn test_input_declares_once() {
        let output = translate("INPUT x\nINPUT x\n").expect("translate failed");
        assert_eq!(
            output,
            "package main\n\nimport (\n\t\"fmt\"\n)\n\nfunc main() {\nvar x = \"\"\nfmt.Scanln(&x)\nfmt.Scanln(&x)\n}"
        );
    }

    #[test]
    fn test_label_and_goto() {
        let output = translate("LABEL top\nGOTO top\n").expect("translate failed");
        assert_eq!(output, "package main\n\nfunc main() {\ntop:\ngoto top\n}");
    }

    #[test]
    fn test_forward_goto_is_legal() {
        let output =
            translate("GOTO end\nLET x = 1\nLABEL end\n").expect("translate failed");
        assert!(output.contains("goto end"));
        assert!(output.contains("end:"));
    }

    #[test]
    fn test_missing_goto_target_fails_after_full_parse() {
        // Everything after the GOTO parses fine; the failure surfaces
        // only at end-of-program resolution
        let err = translate("GOTO missing\nLET x = 1\nPRINT x\n").unwrap_err();
        assert!(matches!(err, Error::UndefinedLabel { ref name, .. } if name == "missing"));
    }

    #[test]
    fn test_first_missing_goto_target_wins() {
        let err = translate("GOTO one\nGOTO two\n").unwrap_err();
        assert!(matches!(err, Error::UndefinedLabel { ref name, .. } if name == "one"));
    }

    #[test]
    fn test_duplicate_label_fails_at_second_declaration() {
        // The undeclared read of y after the duplicate is never reached
        let err = translate("LABEL loop\nLABEL loop\nPRINT y\n").unwrap_err();
        assert!(matches!(err, Error::DuplicateLabel { ref name, .. } if name == "loop"));
    }

    #[test]
    fn test_undeclared_variable_read_fails() {
        let err = translate("PRINT y\n").unwrap_err();
        assert!(matches!(err, Error::UndeclaredVariable { ref name, .. } if name == "y"));
    }

    #[test]
    fn test_plain_assignment_skips_symbol_table() {
        // Assigning to an undeclared name is accepted as-is
        let output = translate("y = 5\n").expect("translate failed");
        assert_eq!(output, "package main\n\nfunc main() {\ny = 5\n}");

        // ...but it does not declare the name either: a later read fails
        let err = translate("y = 5\nPRINT y\n").unwrap_err();
        assert!(matches!(err, Error::UndeclaredVariable { ref name, .. } if name == "y"));
    }

    #[test]
    fn test_plain_assignment_of_string() {
        let output = translate("y = \"hi\"\n").expect("translate failed");
        assert_eq!(output, "package main\n\nfunc main() {\ny = \"hi\"\n}");
    }

    #[test]
    fn test_comparison_operator_required() {
        let err = translate("IF 1 THEN\nENDIF\n").unwrap_err();
        assert!(matches!(err, Error::ExpectedComparison { .. }));
        assert_eq!(err.stage(), "syntax");
    }

    #[test]
    fn test_chained_comparisons() {
        let output = translate("IF 1 < 2 < 3 THEN\nENDIF\n").expect("translate failed");
        assert!(output.contains("if 1<2<3 {"));
    }

    #[test]
    fn test_mismatched_block_closer() {
        let err = translate("IF 1 == 1 THEN\nPRINT \"x\"\nENDWHILE\n").unwrap_err();
        assert_eq!(err.stage(), "syntax");
    }

    #[test]
    fn test_unclosed_block_hits_end_of_input() {
        let err = translate("IF 1 == 1 THEN\nPRINT \"x\"\n").unwrap_err();
        assert_eq!(err.stage(), "syntax");
    }

    #[test]
    fn test_statement_cannot_start_with_newline() {
        let err = translate("\nPRINT \"a\"\n").unwrap_err();
        assert!(matches!(err, Error::UnexpectedStatement { .. }));
    }

    #[test]
    fn test_unary_minus_on_identifier() {
        let output = translate("LET x = 1\nLET y = -x\n").expect("translate failed");
        assert!(output.contains("var y = -x"));
    }

    #[test]
    fn test_round_trip_is_deterministic() {
        let source = "LET a = 1\nWHILE a < 10 REPEAT\nPRINT \"n\", a\nLET a = a + 1\nENDWHILE\nGOTO done\nLABEL done\n";
        let first = translate(source).expect("translate failed");
        let second = translate(source).expect("translate failed");
        assert_eq!(first, second);
    }

    #[test]
    fn test_blank_lines_between_statements() {
        let output = translate("LET x = 1\n\n\nPRINT x\n").expect("translate failed");
        assert!(output.contains("var x = 1\nfmt.Println(x)"));
    }
}
