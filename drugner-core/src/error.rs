//! # Erros do pipeline
//!
//! Um único enum cobre todas as falhas possíveis. As operações do núcleo
//! (tokenização, alinhamento, features) são puras; os erros delas indicam
//! dados de treino que seriam corrompidos em silêncio se o processamento
//! continuasse. As demais variantes vêm das bordas de I/O (corpus, léxicos,
//! configuração).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// O token devolvido pelo tokenizador não aparece no texto a partir do cursor.
    #[error("token {token:?} not found in sentence text at or after char offset {cursor}")]
    TokenNotFound { token: String, cursor: usize },

    /// Span de entidade fora dos limites da sentença (só no modo estrito).
    #[error("entity span {start}-{end} ({entity_type}) is outside sentence of {text_len} chars")]
    SpanOutOfRange {
        start: usize,
        end: usize,
        entity_type: String,
        text_len: usize,
    },

    /// Atributo obrigatório ausente em um elemento do corpus XML.
    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// `charOffset` que não segue o formato `inicio-fim`.
    #[error("invalid charOffset {value:?}")]
    InvalidOffset { value: String },

    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
