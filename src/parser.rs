// Recursive-descent parser: turns a token stream into `Prop` trees, proof
// lines, and registers each `{ ... }` block as its own sub-proof in the
// `Context`, exactly as the original grammar's parse actions did (a nested
// block becomes its own `Proof`, excluded from the enclosing block's own
// line list — see DESIGN.md). One pass builds `Prop` trees directly; there
// is no separate untyped expression layer, unlike the teacher's two-stage
// expression-then-statement parse, since this grammar doesn't need one.

use crate::context::{Context, Proof};
use crate::error::CheckError;
use crate::lexer::{Token, TokenIter, TokenType};
use crate::line::{Justification, Line};
use crate::prop::Prop;

pub struct Parser<'a> {
    iter: TokenIter<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Parser<'a> {
        Parser {
            iter: TokenIter::new(tokens),
        }
    }

    fn peek(&self) -> &Token {
        self.iter.peek()
    }

    fn advance(&mut self) -> Token {
        self.iter.next()
    }

    fn unexpected(&self, what: &str) -> CheckError {
        CheckError::Parse {
            message: format!("expected {}, found `{}`", what, self.peek()),
            pos: self.peek().pos,
        }
    }

    fn expect_num(&mut self) -> Result<i64, CheckError> {
        match self.peek().token_type {
            TokenType::Num(n) => {
                self.advance();
                Ok(n)
            }
            _ => Err(self.unexpected("a number")),
        }
    }

    fn expect_lower(&mut self) -> Result<String, CheckError> {
        match &self.peek().token_type {
            TokenType::Lower(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.unexpected("a lowercase identifier")),
        }
    }

    fn expect(&mut self, tt: TokenType, what: &str) -> Result<(), CheckError> {
        if self.peek().token_type == tt {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    /// `obligation_list := form (',' form)*`
    pub fn parse_obligations(&mut self) -> Result<Vec<Prop>, CheckError> {
        let mut obligations = vec![self.parse_form()?];
        while self.peek().token_type == TokenType::Comma {
            self.advance();
            obligations.push(self.parse_form()?);
        }
        if !self.iter.at_eof() {
            return Err(self.unexpected("end of obligations line"));
        }
        Ok(obligations)
    }

    /// `proof := (line | block)*`. Registers itself as a `Proof` in `ctx`
    /// once every line/nested block in this run has been parsed; a nested
    /// `{ ... }` block registers its own `Proof` (via a recursive call)
    /// and is not counted among this proof's own lines.
    pub fn parse_proof(&mut self, ctx: &mut Context) -> Result<Proof, CheckError> {
        let mut lines = Vec::new();
        loop {
            match self.peek().token_type {
                TokenType::Eof | TokenType::RBrace => break,
                TokenType::LBrace => {
                    self.advance();
                    self.parse_proof(ctx)?;
                    self.expect(TokenType::RBrace, "`}`")?;
                }
                _ => lines.push(self.parse_line()?),
            }
        }
        let nums: Vec<i64> = lines.iter().map(|l| l.num).collect();
        let proof = Proof::new(nums);
        ctx.add_proof(proof.clone(), lines);
        Ok(proof)
    }

    /// `line := num '.' form just ';'`
    fn parse_line(&mut self) -> Result<Line, CheckError> {
        let num = self.expect_num()?;
        self.expect(TokenType::Dot, "`.`")?;
        let typ = self.parse_form()?;
        let just = self.parse_just()?;
        self.expect(TokenType::Semi, "`;`")?;
        Ok(Line::new(num, typ, just))
    }

    /// `just := lowercase_name args?`
    fn parse_just(&mut self) -> Result<Justification, CheckError> {
        let name = self.expect_lower()?;
        let args = if matches!(self.peek().token_type, TokenType::Num(_)) {
            self.parse_args()?
        } else {
            vec![]
        };
        Ok(Justification::new(name, args))
    }

    /// `args := num (',' num)* | num '-' num`
    fn parse_args(&mut self) -> Result<Vec<i64>, CheckError> {
        let first = self.expect_num()?;
        if self.peek().token_type == TokenType::Dash {
            self.advance();
            let last = self.expect_num()?;
            if last < first {
                return Err(CheckError::Parse {
                    message: format!("invalid line range {}-{}", first, last),
                    pos: self.peek().pos,
                });
            }
            Ok((first..=last).collect())
        } else {
            let mut args = vec![first];
            while self.peek().token_type == TokenType::Comma {
                self.advance();
                args.push(self.expect_num()?);
            }
            Ok(args)
        }
    }

    /// `formula := disj ('->' disj)*` — right-associative.
    fn parse_form(&mut self) -> Result<Prop, CheckError> {
        let mut disjs = vec![self.parse_disj()?];
        while self.peek().token_type == TokenType::Arrow {
            self.advance();
            disjs.push(self.parse_disj()?);
        }
        let last = disjs.pop().expect("at least one disj was parsed");
        Ok(disjs
            .into_iter()
            .rev()
            .fold(last, |acc, d| Prop::imp(d, acc)))
    }

    /// `disj := conj ('\/' conj)*` — left-associative.
    fn parse_disj(&mut self) -> Result<Prop, CheckError> {
        let mut acc = self.parse_conj()?;
        while self.peek().token_type == TokenType::Or {
            self.advance();
            let rhs = self.parse_conj()?;
            acc = Prop::or(acc, rhs);
        }
        Ok(acc)
    }

    /// `conj := prop ('/\' prop)*` — left-associative.
    fn parse_conj(&mut self) -> Result<Prop, CheckError> {
        let mut acc = self.parse_prop()?;
        while self.peek().token_type == TokenType::And {
            self.advance();
            let rhs = self.parse_prop()?;
            acc = Prop::and(acc, rhs);
        }
        Ok(acc)
    }

    /// `prop := UPPER | '(' form ')' | '~' prop | predicate
    ///        | 'forall' lower ',' form | 'exists' lower ',' form`
    fn parse_prop(&mut self) -> Result<Prop, CheckError> {
        match self.peek().token_type.clone() {
            TokenType::Upper(name) => {
                self.advance();
                Ok(Prop::base(name))
            }
            TokenType::LParen => {
                self.advance();
                let inner = self.parse_form()?;
                self.expect(TokenType::RParen, "`)`")?;
                Ok(inner)
            }
            TokenType::Tilde => {
                self.advance();
                let inner = self.parse_prop()?;
                Ok(Prop::not(inner))
            }
            TokenType::Lower(_) => self.parse_predicate(),
            TokenType::ForAll => {
                self.advance();
                let var = self.expect_lower()?;
                self.expect(TokenType::Comma, "`,`")?;
                let body = self.parse_form()?;
                Ok(Prop::forall_named(var, body))
            }
            TokenType::Exists => {
                self.advance();
                let var = self.expect_lower()?;
                self.expect(TokenType::Comma, "`,`")?;
                let body = self.parse_form()?;
                Ok(Prop::exists_named(var, body))
            }
            _ => Err(self.unexpected("a formula")),
        }
    }

    /// `predicate := lower '(' lower (',' lower)* ')'`
    fn parse_predicate(&mut self) -> Result<Prop, CheckError> {
        let name = self.expect_lower()?;
        self.expect(TokenType::LParen, "`(`")?;
        let mut args = vec![Prop::model_ref(self.expect_lower()?)];
        while self.peek().token_type == TokenType::Comma {
            self.advance();
            args.push(Prop::model_ref(self.expect_lower()?));
        }
        self.expect(TokenType::RParen, "`)`")?;
        Ok(Prop::Predicate(name, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use indoc::indoc;

    fn parse_formula(src: &str) -> Prop {
        let tokens = lex(src).unwrap();
        let mut parser = Parser::new(&tokens);
        parser.parse_form().unwrap()
    }

    #[test]
    fn test_parse_implication_is_right_associative() {
        let p = parse_formula("A -> B -> C");
        assert_eq!(
            p,
            Prop::imp(Prop::base("A"), Prop::imp(Prop::base("B"), Prop::base("C")))
        );
    }

    #[test]
    fn test_parse_and_or_are_left_associative() {
        let p = parse_formula("A /\\ B /\\ C");
        assert_eq!(
            p,
            Prop::and(Prop::and(Prop::base("A"), Prop::base("B")), Prop::base("C"))
        );
    }

    #[test]
    fn test_parse_negation_and_parens() {
        let p = parse_formula("~(A \\/ B)");
        assert_eq!(p, Prop::not(Prop::or(Prop::base("A"), Prop::base("B"))));
    }

    #[test]
    fn test_parse_quantifier_and_predicate() {
        let p = parse_formula("forall x, p(x)");
        assert_eq!(
            p,
            Prop::forall_named("x", Prop::Predicate("p".to_string(), vec![Prop::model_ref("x")]))
        );
    }

    #[test]
    fn test_parse_proof_registers_nested_subproof() {
        let src = indoc! {"
            1. A \\/ ~A prem;
            {
            2. A prem;
            3. A ded 2-2;
            }
            4. A ded 1-1;
        "};
        let tokens = lex(src).unwrap();
        let mut parser = Parser::new(&tokens);
        let mut ctx = Context::new();
        parser.parse_proof(&mut ctx).unwrap();
        assert_eq!(ctx.lines.len(), 4);
        assert!(ctx.proofs.contains_key(&vec![2, 3]));
        assert!(ctx.main_proof.is_some());
    }
}
