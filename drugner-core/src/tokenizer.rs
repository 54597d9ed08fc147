//! # Tokenizador com Recuperação de Offsets
//!
//! Divide o texto bruto da sentença em tokens (palavras, números e pontuações)
//! e recupera o offset de **caractere** de cada token no texto original.
//! Os offsets são inclusivos nas duas pontas, no mesmo sistema de coordenadas
//! dos atributos `charOffset` do corpus, o que permite alinhar tokens e
//! entidades com aritmética simples.
//!
//! ## Duas etapas
//!
//! 1. **Segmentação** ([`word_tokenize`]): regras no estilo Penn Treebank sobre
//!    as fronteiras de palavra Unicode (UAX #29). Devolve apenas strings, como
//!    os tokenizadores genéricos de NLP costumam fazer.
//! 2. **Localização** ([`locate_tokens`]): cada string é procurada no texto a
//!    partir de um cursor que só avança. O cursor começa no início do texto e,
//!    após cada token encontrado, passa para `inicio + len(token)`. Assim
//!    "test test" recebe offsets `0-3` e `5-8`, nunca `0-3` duas vezes.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use drugner_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("Take aspirin now.").unwrap();
//! assert_eq!(tokens[1].text, "aspirin");
//! assert_eq!((tokens[1].start, tokens[1].end), (5, 11));
//! assert_eq!(tokens[3].text, ".");
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};

/// Um token extraído do texto original.
///
/// `start` e `end` são offsets de caractere **inclusivos**:
/// `end == start + text.chars().count() - 1`. Um token pertence à sentença
/// que o produziu e não é alterado depois de criado.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// O texto do token (ex: "aspirin", ",", "n't").
    pub text: String,
    /// Offset de caractere inicial no texto original (inclusivo).
    pub start: usize,
    /// Offset de caractere final no texto original (inclusivo).
    pub end: usize,
    /// Índice sequencial do token na sentença (0, 1, 2...).
    pub index: usize,
}

impl Token {
    /// Comprimento do token em caracteres.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Clíticos separados da palavra hospedeira ("don't" -> "do", "n't").
fn clitic_regex() -> &'static Regex {
    static CLITIC: OnceLock<Regex> = OnceLock::new();
    CLITIC.get_or_init(|| {
        Regex::new(r"(?i)^(.+?)(n['’]t|['’](?:s|m|d|ll|re|ve))$").expect("valid clitic regex")
    })
}

/// Tokeniza a sentença e recupera o offset de cada token.
///
/// Texto vazio (ou só com espaços) gera uma lista vazia.
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    locate_tokens(text, word_tokenize(text))
}

/// Segmenta o texto em strings de tokens, sem offsets.
///
/// Regras aplicadas sobre as fronteiras de palavra Unicode:
/// - espaços separam tokens e são descartados;
/// - cada sinal de pontuação vira um token próprio, inclusive o hífen
///   ("acetyl-salicylic" -> "acetyl", "-", "salicylic") e os sinais que o
///   UAX #29 deixa entre letras ("Note:aspirin" -> "Note", ":", "aspirin");
/// - números decimais e com separador de milhar ficam inteiros ("2.5", "1,000");
/// - contrações são separadas ("doesn't" -> "does", "n't"; "drug's" -> "drug", "'s");
/// - reticências ("...") formam um único token.
pub fn word_tokenize(text: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut prev_end: Option<usize> = None;

    for (offset, segment) in text.split_word_bound_indices() {
        // Marcas combinantes podem vir coladas a um espaço (" \u{301}")
        let trimmed = segment.trim_start();
        if trimmed.is_empty() {
            prev_end = None;
            continue;
        }
        let offset = offset + (segment.len() - trimmed.len());
        let segment = trimmed;

        // Reticências: pontos colados ao ponto anterior são acumulados
        if segment == "." && prev_end == Some(offset) {
            if let Some(last) = words.last_mut() {
                if last.chars().all(|c| c == '.') {
                    last.push('.');
                    prev_end = Some(offset + segment.len());
                    continue;
                }
            }
        }

        match clitic_regex().captures(segment) {
            Some(caps) => {
                split_inner_punct(&caps[1], &mut words);
                words.push(caps[2].to_string());
            }
            None => split_inner_punct(segment, &mut words),
        }
        prev_end = Some(offset + segment.len());
    }

    words
}

/// Separa a pontuação que as fronteiras Unicode mantêm dentro da palavra
/// (`:` `.` `'` entre letras, como em "Note:aspirin" ou "mg.Then").
/// `.` e `,` entre dígitos ficam ("2.5", "1,000").
fn split_inner_punct(segment: &str, words: &mut Vec<String>) {
    let chars: Vec<char> = segment.chars().collect();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let numeric_separator = matches!(c, '.' | ',')
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());

        if is_inner_punct(c) && !numeric_separator {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            words.push(c.to_string());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
}

fn is_inner_punct(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '‘' | '’' | '·' | '…')
}

/// Posição do cursor de busca: em bytes (para fatiar a `str`) e em caracteres
/// (para os offsets publicados).
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    byte: usize,
    chars: usize,
}

/// Localiza cada string de token no texto, da esquerda para a direita.
///
/// Aceita a saída de qualquer tokenizador que devolva strings; a ordem
/// precisa ser a mesma do texto. Se um token não aparece a partir do cursor
/// corrente, retorna [`Error::TokenNotFound`] em vez de inventar um offset.
pub fn locate_tokens<I, S>(text: &str, words: I) -> Result<Vec<Token>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tokens = Vec::new();
    words
        .into_iter()
        .try_fold(Cursor::default(), |cursor, word| {
            let word: String = word.into();
            let (token, next) = locate_one(text, word, cursor, tokens.len())?;
            tokens.push(token);
            Ok::<_, Error>(next)
        })?;
    Ok(tokens)
}

fn locate_one(text: &str, word: String, cursor: Cursor, index: usize) -> Result<(Token, Cursor)> {
    let rest = &text[cursor.byte..];
    let found = match rest.find(word.as_str()) {
        Some(found) if !word.is_empty() => found,
        _ => {
            return Err(Error::TokenNotFound {
                token: word,
                cursor: cursor.chars,
            })
        }
    };

    let start = cursor.chars + rest[..found].chars().count();
    let len = word.chars().count();
    let next = Cursor {
        byte: cursor.byte + found + word.len(),
        chars: start + len,
    };

    let token = Token {
        text: word,
        start,
        end: start + len - 1,
        index,
    };
    Ok((token, next))
}
