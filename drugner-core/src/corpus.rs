//! # Leitura do Corpus Anotado (formato DDI)
//!
//! Cada arquivo XML traz um documento com sentenças e entidades:
//!
//! ```xml
//! <document id="DDI-DrugBank.d1">
//!   <sentence id="DDI-DrugBank.d1.s0" text="Take aspirin now.">
//!     <entity id="DDI-DrugBank.d1.s0.e0" charOffset="5-11" type="drug" text="aspirin"/>
//!   </sentence>
//! </document>
//! ```
//!
//! `charOffset` usa offsets de caractere inclusivos. Entidades descontínuas
//! aparecem como pares separados por `;` (`"10-14;27-33"`); só o primeiro par
//! é usado, aproximação documentada e não um erro.
//!
//! A validação é feita aqui: atributo ausente ou offset ilegível torna o
//! documento inteiro inválido. O núcleo (tokenização, tags, features) assume
//! entrada bem-formada.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::tagger::EntitySpan;

/// Uma sentença anotada: id, texto bruto e spans das entidades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: String,
    pub text: String,
    pub spans: Vec<EntitySpan>,
}

/// Um arquivo do corpus com suas sentenças, na ordem do documento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub path: PathBuf,
    pub sentences: Vec<Sentence>,
}

/// Interpreta um `charOffset`, devolvendo o primeiro intervalo contíguo.
pub fn parse_char_offset(value: &str) -> Result<(usize, usize)> {
    let invalid = || Error::InvalidOffset {
        value: value.to_string(),
    };

    let mut pairs = value.split(';');
    let first = pairs.next().unwrap_or_default();
    let (start, end) = first.trim().split_once('-').ok_or_else(invalid)?;
    let start: usize = start.trim().parse().map_err(|_| invalid())?;
    let end: usize = end.trim().parse().map_err(|_| invalid())?;
    if start > end {
        return Err(invalid());
    }

    let ignored: Vec<&str> = pairs.collect();
    if !ignored.is_empty() {
        debug!(char_offset = value, ?ignored, "discontinuous entity: keeping first span only");
    }
    Ok((start, end))
}

/// Lê as sentenças de um documento XML.
pub fn parse_document(xml: &str) -> Result<Vec<Sentence>> {
    let doc = roxmltree::Document::parse(xml)?;

    doc.descendants()
        .filter(|n| n.has_tag_name("sentence"))
        .map(|node| {
            let id = required(&node, "sentence", "id")?;
            let text = required(&node, "sentence", "text")?;

            let spans = node
                .children()
                .filter(|n| n.has_tag_name("entity"))
                .map(|entity| {
                    let offset = required(&entity, "entity", "charOffset")?;
                    let entity_type = required(&entity, "entity", "type")?;
                    let (start, end) = parse_char_offset(offset)?;
                    Ok(EntitySpan::new(start, end, entity_type))
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(Sentence {
                id: id.to_string(),
                text: text.to_string(),
                spans,
            })
        })
        .collect()
}

fn required<'a>(
    node: &roxmltree::Node<'a, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str> {
    node.attribute(attribute)
        .ok_or(Error::MissingAttribute { element, attribute })
}

/// Lê e interpreta um arquivo do corpus.
pub fn read_document(path: &Path) -> Result<Document> {
    let xml = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let sentences = parse_document(&xml)?;
    debug!(path = %path.display(), sentences = sentences.len(), "document parsed");
    Ok(Document {
        path: path.to_path_buf(),
        sentences,
    })
}

/// Lista os arquivos regulares de um diretório, ordenados pelo nome.
///
/// A ordem fixa garante saída idêntica entre execuções e sistemas de arquivos.
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
