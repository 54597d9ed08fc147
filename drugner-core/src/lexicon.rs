//! # Recursos Léxicos
//!
//! Dicionários somente-leitura usados pelas features opcionais:
//!
//! - [`DrugLexicon`]: nomes de fármacos (exportação do DrugBank, lista do HSDB).
//! - [`SenseIndex`]: contagem de sentidos por classe gramatical, lida dos
//!   arquivos `index.noun`, `index.verb`, `index.adj` e `index.adv` do WordNet.
//!   Formas flexionadas ("drugs", "anticoagulants") são reduzidas ao lema
//!   pelas regras de destacamento do WordNet e pelos arquivos `*.exc`.
//!
//! Depois de carregados não mudam mais; são compartilhados entre threads via `Arc`.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Lista ordenada de nomes de fármacos.
///
/// A ordenação permite a busca por ponto de inserção usada pela feature de
/// similaridade; o conjunto em minúsculas atende a consulta sem caixa.
#[derive(Debug, Clone, Default)]
pub struct DrugLexicon {
    names: Vec<String>,
    lowercase: HashSet<String>,
}

impl DrugLexicon {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorted: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        sorted.sort();
        sorted.dedup();
        let lowercase = sorted.iter().map(|n| n.to_lowercase()).collect();
        Self {
            names: sorted,
            lowercase,
        }
    }

    /// Lê uma exportação do DrugBank: uma entrada `nome|tipo` por linha,
    /// só o primeiro campo é usado.
    pub fn parse_drugbank(content: &str) -> Vec<String> {
        content
            .lines()
            .filter_map(|line| line.split('|').next())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Lê uma lista simples, um nome por linha (formato do HSDB).
    pub fn parse_plain(content: &str) -> Vec<String> {
        content
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Carrega e mescla as fontes informadas.
    pub fn load(drugbank: Option<&Path>, plain_lists: &[impl AsRef<Path>]) -> Result<Self> {
        let mut names = Vec::new();
        if let Some(path) = drugbank {
            names.extend(Self::parse_drugbank(&read(path)?));
        }
        for path in plain_lists {
            names.extend(Self::parse_plain(&read(path.as_ref())?));
        }
        let lexicon = Self::from_names(names);
        debug!(entries = lexicon.len(), "drug lexicon loaded");
        Ok(lexicon)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.names.binary_search_by(|n| n.as_str().cmp(word)).is_ok()
    }

    pub fn contains_lowercase(&self, word: &str) -> bool {
        self.lowercase.contains(&word.to_lowercase())
    }

    /// Entrada no ponto de inserção à direita de `word` (como `bisect_right`),
    /// limitada à última entrada. `None` se o léxico está vazio.
    pub fn neighbor(&self, word: &str) -> Option<&str> {
        let position = self.names.partition_point(|n| n.as_str() <= word);
        self.names
            .get(position)
            .or_else(|| self.names.last())
            .map(String::as_str)
    }
}

/// Classe gramatical de um arquivo de índice do WordNet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl PartOfSpeech {
    pub fn all() -> [PartOfSpeech; 4] {
        [
            PartOfSpeech::Noun,
            PartOfSpeech::Verb,
            PartOfSpeech::Adjective,
            PartOfSpeech::Adverb,
        ]
    }

    /// Nome do arquivo de índice correspondente
    pub fn index_file(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "index.noun",
            PartOfSpeech::Verb => "index.verb",
            PartOfSpeech::Adjective => "index.adj",
            PartOfSpeech::Adverb => "index.adv",
        }
    }

    /// Arquivo de exceções morfológicas (formas irregulares)
    pub fn exception_file(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun.exc",
            PartOfSpeech::Verb => "verb.exc",
            PartOfSpeech::Adjective => "adj.exc",
            PartOfSpeech::Adverb => "adv.exc",
        }
    }

    /// Regras de destacamento de sufixo: `(sufixo, substituição)`.
    fn detachment_rules(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            PartOfSpeech::Noun => &[
                ("s", ""),
                ("ses", "s"),
                ("ves", "f"),
                ("xes", "x"),
                ("zes", "z"),
                ("ches", "ch"),
                ("shes", "sh"),
                ("men", "man"),
                ("ies", "y"),
            ],
            PartOfSpeech::Verb => &[
                ("s", ""),
                ("ies", "y"),
                ("es", "e"),
                ("es", ""),
                ("ed", "e"),
                ("ed", ""),
                ("ing", "e"),
                ("ing", ""),
            ],
            PartOfSpeech::Adjective => &[("er", ""), ("est", ""), ("er", "e"), ("est", "e")],
            PartOfSpeech::Adverb => &[],
        }
    }
}

/// Contagem de sentidos (synsets) por palavra e classe gramatical.
#[derive(Debug, Clone, Default)]
pub struct SenseIndex {
    senses: HashMap<String, HashMap<PartOfSpeech, usize>>,
    exceptions: HashMap<PartOfSpeech, HashMap<String, Vec<String>>>,
}

impl SenseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adiciona as entradas de um arquivo de índice.
    ///
    /// Formato: `lema pos synset_cnt ...`; linhas iniciadas por espaço são
    /// o cabeçalho de licença. Lemas compostos usam `_` e são guardados com
    /// espaço; linhas curtas ou com contagem inválida são ignoradas.
    pub fn add_index(&mut self, pos: PartOfSpeech, content: &str) {
        for line in content.lines().filter(|l| !l.starts_with(' ')) {
            let mut fields = line.split_whitespace();
            let (Some(lemma), Some(_pos), Some(count)) = (fields.next(), fields.next(), fields.next())
            else {
                continue;
            };
            let Ok(count) = count.parse::<usize>() else {
                continue;
            };
            *self
                .senses
                .entry(lemma.replace('_', " ").to_lowercase())
                .or_default()
                .entry(pos)
                .or_default() += count;
        }
    }

    /// Adiciona um arquivo de exceções: `flexionada lema [lema...]` por linha.
    pub fn add_exceptions(&mut self, pos: PartOfSpeech, content: &str) {
        let table = self.exceptions.entry(pos).or_default();
        for line in content.lines() {
            let mut fields = line.split_whitespace();
            let Some(inflected) = fields.next() else {
                continue;
            };
            let lemmas: Vec<String> = fields.map(|l| l.replace('_', " ").to_lowercase()).collect();
            if !lemmas.is_empty() {
                table
                    .entry(inflected.replace('_', " ").to_lowercase())
                    .or_default()
                    .extend(lemmas);
            }
        }
    }

    /// Carrega os arquivos de índice e de exceções de um diretório `dict/`
    /// do WordNet. Arquivos ausentes são pulados.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut index = Self::new();
        for pos in PartOfSpeech::all() {
            let path = dir.join(pos.index_file());
            if !path.is_file() {
                debug!(path = %path.display(), "sense index file not found, skipping");
                continue;
            }
            index.add_index(pos, &read(&path)?);

            let exc = dir.join(pos.exception_file());
            if exc.is_file() {
                index.add_exceptions(pos, &read(&exc)?);
            }
        }
        debug!(words = index.senses.len(), "sense index loaded");
        Ok(index)
    }

    /// Lemas de `word` presentes no índice para a classe `pos`.
    ///
    /// Uma forma listada nas exceções usa só a própria forma e os lemas da
    /// exceção. Senão, a forma e cada candidato gerado pelas regras de
    /// destacamento que exista no índice. Sem repetições, na ordem encontrada.
    pub fn base_forms(&self, word: &str, pos: PartOfSpeech) -> Vec<String> {
        let word = word.to_lowercase();
        let mut candidates = vec![word.clone()];

        match self.exceptions.get(&pos).and_then(|t| t.get(&word)) {
            Some(lemmas) => candidates.extend(lemmas.iter().cloned()),
            None => candidates.extend(pos.detachment_rules().iter().filter_map(|(suffix, repl)| {
                word.strip_suffix(suffix).map(|stem| format!("{stem}{repl}"))
            })),
        }

        let mut forms: Vec<String> = Vec::new();
        for form in candidates {
            let indexed = self.senses.get(&form).is_some_and(|by_pos| by_pos.contains_key(&pos));
            if indexed && !forms.contains(&form) {
                forms.push(form);
            }
        }
        forms
    }

    /// Número de sentidos de `word` na classe `pos`, somado sobre os lemas
    /// de [`SenseIndex::base_forms`] (busca sem caixa).
    pub fn count(&self, word: &str, pos: PartOfSpeech) -> usize {
        self.base_forms(word, pos)
            .iter()
            .filter_map(|form| self.senses.get(form).and_then(|by_pos| by_pos.get(&pos)))
            .sum()
    }

    /// Número total de sentidos de `word` em todas as classes.
    pub fn total(&self, word: &str) -> usize {
        PartOfSpeech::all().iter().map(|&pos| self.count(word, pos)).sum()
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}
