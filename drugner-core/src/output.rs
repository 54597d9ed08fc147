//! # Escrita da Tabela de Features
//!
//! Formato do crfsuite, uma linha por token, campos separados por TAB:
//!
//! ```text
//! sid  token  inicio  fim  tag  feature_1 ... feature_m
//! ```
//!
//! Uma linha em branco encerra cada sentença. O formato JSON-lines é uma
//! alternativa para inspeção: um objeto por token com os mesmos campos.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::tagger::TaggedToken;

/// Resultado do processamento de uma sentença.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub sentence_id: String,
    pub tokens: Vec<TaggedToken>,
    /// Alinhado posicionalmente com `tokens`.
    pub features: Vec<FeatureVector>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Tabela separada por TAB, entrada do `crfsuite learn`.
    #[default]
    Crfsuite,
    /// Um objeto JSON por token.
    Jsonl,
}

/// Linha JSON de um token.
#[derive(Debug, Serialize)]
struct TokenRow<'a> {
    sentence_id: &'a str,
    token: &'a str,
    start: usize,
    end: usize,
    tag: String,
    features: Vec<String>,
}

/// Escreve o bloco de uma sentença no formato pedido.
pub fn write_record<W: Write>(out: &mut W, record: &SentenceRecord, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Crfsuite => write_crfsuite(out, record),
        OutputFormat::Jsonl => write_jsonl(out, record),
    }
}

fn write_crfsuite<W: Write>(out: &mut W, record: &SentenceRecord) -> io::Result<()> {
    for (tagged, fv) in record.tokens.iter().zip(&record.features) {
        let token = &tagged.token;
        write!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            record.sentence_id, token.text, token.start, token.end, tagged.tag
        )?;
        for feature in &fv.features {
            write!(out, "\t{feature}")?;
        }
        writeln!(out)?;
    }
    // Linha em branco separa sentenças
    writeln!(out)
}

fn write_jsonl<W: Write>(out: &mut W, record: &SentenceRecord) -> io::Result<()> {
    for (tagged, fv) in record.tokens.iter().zip(&record.features) {
        let row = TokenRow {
            sentence_id: &record.sentence_id,
            token: &tagged.token.text,
            start: tagged.token.start,
            end: tagged.token.end,
            tag: tagged.tag.label(),
            features: fv.to_strings(),
        };
        serde_json::to_writer(&mut *out, &row)?;
        writeln!(out)?;
    }
    Ok(())
}
