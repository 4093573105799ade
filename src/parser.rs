// src/parser.rs
use swc_common::comments::SingleThreadedComments;
use swc_common::{sync::Lrc, FileName, SourceMap, Spanned};
use swc_ecma_ast::*;
use swc_ecma_codegen::text_writer::JsWriter;
use swc_ecma_codegen::{Config, Emitter};
use swc_ecma_parser::{lexer::Lexer, EsConfig, Parser as SwcParser, StringInput, Syntax, TsConfig};

use crate::config::SyntaxMode;
use crate::error::{ParseError, TransformError};

/// A parsed module together with the comments attached to it.
pub struct ParsedModule {
    pub module: Module,
    pub comments: SingleThreadedComments,
}

/// Owns the source map shared by one transformed file and every snippet
/// parsed to build its replacement fragments. Snippets get their own byte
/// range so their spans never collide with the file's comments.
#[derive(Default)]
pub struct SourceContext {
    cm: Lrc<SourceMap>,
}

fn syntax_for(mode: SyntaxMode) -> Syntax {
    match mode {
        SyntaxMode::Tsx | SyntaxMode::Typescript => Syntax::Typescript(TsConfig {
            tsx: mode == SyntaxMode::Tsx,
            decorators: true,
            ..Default::default()
        }),
        SyntaxMode::Javascript => Syntax::Es(EsConfig {
            jsx: true,
            decorators: true,
            ..Default::default()
        }),
    }
}

impl SourceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `src` as an ES module. Errors the parser recovered from are
    /// reported as failures too: a tree built around them would be printed
    /// back differently from what the author wrote.
    pub fn parse(&self, name: &str, src: &str, mode: SyntaxMode) -> Result<ParsedModule, ParseError> {
        let fm = self
            .cm
            .new_source_file(FileName::Custom(name.to_string()), src.to_string());
        let comments = SingleThreadedComments::default();
        let lexer = Lexer::new(
            syntax_for(mode),
            EsVersion::EsNext,
            StringInput::from(&*fm),
            Some(&comments),
        );
        let mut parser = SwcParser::new_from(lexer);

        let module = parser
            .parse_module()
            .map_err(|e| self.parse_error(name, &e))?;
        if let Some(e) = parser.take_errors().first() {
            return Err(self.parse_error(name, e));
        }

        Ok(ParsedModule { module, comments })
    }

    pub fn print(
        &self,
        module: &Module,
        comments: Option<&SingleThreadedComments>,
    ) -> Result<String, TransformError> {
        let mut buf = Vec::new();
        {
            let mut emitter = Emitter {
                cfg: Config::default(),
                cm: self.cm.clone(),
                comments: comments.map(|c| c as &dyn swc_common::comments::Comments),
                wr: JsWriter::new(self.cm.clone(), "\n", &mut buf, None),
            };
            emitter.emit_module(module)?;
        }
        Ok(String::from_utf8(buf)?)
    }

    /// Parses a template of module items, such as a replacement import.
    pub(crate) fn parse_items(&self, snippet: &str) -> Result<Vec<ModuleItem>, ParseError> {
        self.parse("<replacement>", snippet, SyntaxMode::Tsx)
            .map(|parsed| parsed.module.body)
    }

    /// Parses a template expression. A parenthesized template is unwrapped,
    /// so object literals can be written as `({ .. })`.
    pub(crate) fn parse_expr(&self, snippet: &str) -> Result<Box<Expr>, ParseError> {
        let fm = self
            .cm
            .new_source_file(FileName::Custom("<replacement>".into()), snippet.to_string());
        let lexer = Lexer::new(
            syntax_for(SyntaxMode::Tsx),
            EsVersion::EsNext,
            StringInput::from(&*fm),
            None,
        );
        let mut parser = SwcParser::new_from(lexer);
        let expr = parser
            .parse_expr()
            .map_err(|e| self.parse_error("<replacement>", &e))?;
        Ok(match *expr {
            Expr::Paren(paren) => paren.expr,
            other => Box::new(other),
        })
    }

    fn parse_error(&self, file: &str, err: &swc_ecma_parser::error::Error) -> ParseError {
        let loc = self.cm.lookup_char_pos(err.span().lo);
        ParseError {
            file: file.to_string(),
            line: loc.line,
            column: loc.col.0 + 1,
            message: err.kind().msg().into_owned(),
        }
    }
}
