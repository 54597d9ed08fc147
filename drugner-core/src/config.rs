//! # Configuração
//!
//! Arquivo TOML opcional. Sem ele (ou com seções ausentes) os padrões
//! reproduzem exatamente o conjunto de features de referência: modo
//! tolerante, processamento sequencial e nenhum contribuidor extra.
//!
//! ```toml
//! [aligner]
//! strict = true
//!
//! [pipeline]
//! parallel = true
//! keep_going = false
//!
//! [contributors]
//! digits = true
//! lexicon = true
//! fuzzy = true
//! fuzzy_max_len = 5
//! drugbank = "resources/DrugBank.txt"
//! drug_lists = ["resources/HSDB.txt"]
//! noun_ratio = true
//! wordnet_dir = "/usr/share/wordnet/dict"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::FuzzySimilarity;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub aligner: AlignerConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub contributors: ContributorsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlignerConfig {
    /// Spans fora do texto viram erro em vez de aviso.
    pub strict: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Processa documentos em paralelo (rayon).
    pub parallel: bool,
    /// Registra documentos inválidos e segue com os demais.
    pub keep_going: bool,
}

/// Contribuidores de features opcionais e os recursos que eles leem.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContributorsConfig {
    pub digits: bool,
    pub char_counts: bool,
    pub lexicon: bool,
    pub fuzzy: bool,
    /// Tokens com esse número de caracteres ou mais recebem `UNKNOWN`.
    pub fuzzy_max_len: usize,
    pub noun_ratio: bool,
    /// Exportação do DrugBank (`nome|tipo`).
    pub drugbank: Option<PathBuf>,
    /// Listas simples, um nome por linha.
    pub drug_lists: Vec<PathBuf>,
    /// Diretório com `index.noun`, `index.verb`, ...
    pub wordnet_dir: Option<PathBuf>,
}

impl Default for ContributorsConfig {
    fn default() -> Self {
        Self {
            digits: false,
            char_counts: false,
            lexicon: false,
            fuzzy: false,
            fuzzy_max_len: FuzzySimilarity::DEFAULT_MAX_LEN,
            noun_ratio: false,
            drugbank: None,
            drug_lists: Vec::new(),
            wordnet_dir: None,
        }
    }
}

impl ContributorsConfig {
    /// Algum contribuidor precisa do léxico de fármacos?
    pub fn needs_drug_lexicon(&self) -> bool {
        self.lexicon || self.fuzzy
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(p) = self.drugbank.as_mut() {
            resolve(p);
        }
        self.drug_lists.iter_mut().for_each(resolve);
        if let Some(p) = self.wordnet_dir.as_mut() {
            resolve(p);
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Lê o arquivo; caminhos relativos de recursos são resolvidos a partir
    /// do diretório do próprio arquivo.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.contributors.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.contributors;
        if c.needs_drug_lexicon() && c.drugbank.is_none() && c.drug_lists.is_empty() {
            return Err(Error::Config(
                "lexicon/fuzzy contributors need `drugbank` or `drug_lists`".to_string(),
            ));
        }
        if c.noun_ratio && c.wordnet_dir.is_none() {
            return Err(Error::Config(
                "noun_ratio contributor needs `wordnet_dir`".to_string(),
            ));
        }
        if c.fuzzy && c.fuzzy_max_len == 0 {
            return Err(Error::Config("fuzzy_max_len must be at least 1".to_string()));
        }
        Ok(())
    }
}
