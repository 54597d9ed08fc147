//! # Esquema BIO e Alinhamento de Spans
//!
//! Converte as entidades anotadas no corpus (intervalos de caracteres) em
//! tags BIO por token:
//!
//! - `B-TIPO`: Begin, o token começa exatamente no início da entidade
//! - `I-TIPO`: Inside, o token está dentro da entidade, depois do início
//! - `O`: Outside, o token não está contido em nenhuma entidade
//!
//! Os tipos de entidade são livres (ex: `drug`, `brand`, `group`, `drug_n`
//! no corpus DDI); não há lista fixa de categorias.
//!
//! ## Política de correspondência
//!
//! Os spans são percorridos na ordem recebida e o **primeiro** que contém o
//! token decide a tag. Spans sobrepostos, portanto, dependem da ordem do
//! chamador. Um token que ultrapassa o fim do span, ou começa antes dele,
//! não é considerado parte da entidade.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::tokenizer::Token;

/// Uma entidade anotada: intervalo de caracteres inclusivo + tipo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Offset de caractere inicial (inclusivo).
    pub start: usize,
    /// Offset de caractere final (inclusivo).
    pub end: usize,
    /// Categoria da entidade (ex: "drug", "brand").
    pub entity_type: String,
}

impl EntitySpan {
    pub fn new(start: usize, end: usize, entity_type: impl Into<String>) -> Self {
        Self {
            start,
            end,
            entity_type: entity_type.into(),
        }
    }

    /// Verifica se o span cabe em um texto de `text_len` caracteres.
    pub fn is_within(&self, text_len: usize) -> bool {
        self.start <= self.end && self.end < text_len
    }
}

/// Tag BIO aplicada a um token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// **Begin**: o token abre a entidade. Ex: **acetyl** (B-drug) salicylic acid.
    Begin(String),
    /// **Inside**: o token continua a entidade. Ex: acetyl **salicylic** (I-drug) acid.
    Inside(String),
    /// **Outside**: o token não faz parte de nenhuma entidade.
    Outside,
}

impl Tag {
    /// Representação textual da tag (ex: "B-drug", "I-brand", "O")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(t) => format!("B-{t}"),
            Tag::Inside(t) => format!("I-{t}"),
            Tag::Outside => "O".to_string(),
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Um token com a tag BIO derivada dos spans da sentença
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub token: Token,
    pub tag: Tag,
}

/// Decide a tag de um token contra a lista de spans da sentença.
///
/// Varredura linear com retorno antecipado: o primeiro span que contém o
/// token vence. Se nenhum contém, a tag é `O`.
pub fn tag_for(token: &Token, spans: &[EntitySpan]) -> Tag {
    for span in spans {
        if token.start == span.start && token.end <= span.end {
            return Tag::Begin(span.entity_type.clone());
        }
        if token.start >= span.start && token.end <= span.end {
            return Tag::Inside(span.entity_type.clone());
        }
    }
    Tag::Outside
}

/// Alinha os spans de uma sentença aos seus tokens.
///
/// No modo tolerante (padrão) um span fora dos limites do texto só gera um
/// aviso de log; a regra de contenção continua a mesma, então um span
/// inteiramente além do texto não casa com token algum. No modo estrito ele
/// vira [`Error::SpanOutOfRange`], pois quase sempre indica corpus inconsistente.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanAligner {
    pub strict: bool,
}

impl SpanAligner {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Etiqueta cada token de `tokens`, na ordem, contra `spans`.
    pub fn align(&self, text: &str, tokens: &[Token], spans: &[EntitySpan]) -> Result<Vec<TaggedToken>> {
        self.check_spans(text, spans)?;

        let tagged: Vec<TaggedToken> = tokens
            .iter()
            .map(|token| TaggedToken {
                token: token.clone(),
                tag: tag_for(token, spans),
            })
            .collect();

        report_unaligned(spans, &tagged);
        Ok(tagged)
    }

    fn check_spans(&self, text: &str, spans: &[EntitySpan]) -> Result<()> {
        let text_len = text.chars().count();
        for span in spans.iter().filter(|s| !s.is_within(text_len)) {
            if self.strict {
                return Err(Error::SpanOutOfRange {
                    start: span.start,
                    end: span.end,
                    entity_type: span.entity_type.clone(),
                    text_len,
                });
            }
            warn!(
                start = span.start,
                end = span.end,
                entity_type = %span.entity_type,
                text_len,
                "entity span outside sentence text"
            );
        }
        Ok(())
    }
}

/// Registra spans que nenhum token abre: a tokenização não respeitou a
/// fronteira anotada e a entidade vai sumir (ou virar só `I-`) no treino.
fn report_unaligned(spans: &[EntitySpan], tagged: &[TaggedToken]) {
    for span in spans {
        let opened = tagged
            .iter()
            .any(|t| t.token.start == span.start && t.token.end <= span.end);
        if !opened {
            debug!(
                start = span.start,
                end = span.end,
                entity_type = %span.entity_type,
                "no token starts at entity span boundary"
            );
        }
    }
}
