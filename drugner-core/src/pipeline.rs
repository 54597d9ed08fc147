//! # Pipeline de Extração
//!
//! Coordena os módulos para cada sentença:
//!
//! 1. Tokenização com offsets ([`tokenize`]).
//! 2. Tag BIO de cada token contra os spans da sentença ([`SpanAligner`]).
//! 3. Features de toda a sentença ([`FeatureExtractor`]).
//!
//! Sentenças e documentos são independentes: nada é compartilhado além de
//! recursos léxicos imutáveis. Em modo paralelo os documentos são
//! distribuídos pelo `rayon` em lotes e coletados na ordem original, então
//! a saída é a mesma do modo sequencial.

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::Config;
use crate::corpus::{list_documents, read_document, Document, Sentence};
use crate::error::Result;
use crate::features::{
    CharCounts, DigitFeatures, FeatureExtractor, FuzzySimilarity, LexiconMembership, NounRatio,
};
use crate::lexicon::{DrugLexicon, SenseIndex};
use crate::output::SentenceRecord;
use crate::tagger::SpanAligner;
use crate::tokenizer::tokenize;

/// Documentos por thread em cada lote do modo paralelo.
const DOCUMENTS_PER_THREAD: usize = 4;

/// Resultado de um documento: registros de todas as sentenças, ou o erro
/// que invalidou o documento.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    pub records: Result<Vec<SentenceRecord>>,
}

/// O pipeline principal.
#[derive(Debug, Clone, Default)]
pub struct FeaturePipeline {
    pub aligner: SpanAligner,
    pub extractor: FeatureExtractor,
    pub parallel: bool,
}

impl FeaturePipeline {
    /// Pipeline com as features fixas, modo tolerante e sequencial.
    pub fn new() -> Self {
        Self::default()
    }

    /// Monta o pipeline a partir da configuração, carregando os recursos
    /// léxicos dos contribuidores habilitados.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let c = &config.contributors;
        let mut extractor = FeatureExtractor::new();

        if c.digits {
            extractor = extractor.with_contributor(Arc::new(DigitFeatures));
        }
        if c.char_counts {
            extractor = extractor.with_contributor(Arc::new(CharCounts));
        }
        if c.needs_drug_lexicon() {
            let lexicon = Arc::new(DrugLexicon::load(c.drugbank.as_deref(), &c.drug_lists)?);
            if c.lexicon {
                extractor = extractor.with_contributor(Arc::new(LexiconMembership::new(Arc::clone(&lexicon))));
            }
            if c.fuzzy {
                extractor = extractor.with_contributor(Arc::new(FuzzySimilarity::new(lexicon, c.fuzzy_max_len)));
            }
        }
        if let Some(dir) = c.wordnet_dir.as_deref().filter(|_| c.noun_ratio) {
            let senses = Arc::new(SenseIndex::load_dir(dir)?);
            extractor = extractor.with_contributor(Arc::new(NounRatio::new(senses)));
        }

        info!(
            strict = config.aligner.strict,
            parallel = config.pipeline.parallel,
            contributors = ?extractor.contributor_names(),
            "pipeline configured"
        );

        Ok(Self {
            aligner: SpanAligner::new(config.aligner.strict),
            extractor,
            parallel: config.pipeline.parallel,
        })
    }

    /// Processa uma sentença: tokens, tags e features.
    pub fn process_sentence(&self, sentence: &Sentence) -> Result<SentenceRecord> {
        let tokens = tokenize(&sentence.text)?;
        let tagged = self.aligner.align(&sentence.text, &tokens, &sentence.spans)?;
        let features = self.extractor.extract(&tokens);
        debug!(sentence = %sentence.id, tokens = tokens.len(), "sentence processed");

        Ok(SentenceRecord {
            sentence_id: sentence.id.clone(),
            tokens: tagged,
            features,
        })
    }

    /// Processa todas as sentenças de um documento; o primeiro erro
    /// invalida o documento.
    pub fn process_document(&self, document: &Document) -> Result<Vec<SentenceRecord>> {
        document
            .sentences
            .iter()
            .map(|s| self.process_sentence(s))
            .collect()
    }

    /// Lê e processa um arquivo do corpus.
    pub fn process_file(&self, path: &Path) -> DocumentOutcome {
        let records = read_document(path).and_then(|doc| self.process_document(&doc));
        DocumentOutcome {
            path: path.to_path_buf(),
            records,
        }
    }

    /// Entrega o resultado de cada arquivo a `sink`, na ordem dada, assim que
    /// fica pronto. Um erro devolvido por `sink` interrompe o processamento.
    ///
    /// No modo sequencial cada documento só é lido depois que o anterior foi
    /// entregue. No modo paralelo os arquivos são processados em lotes de
    /// tamanho proporcional ao número de threads do `rayon`; cada lote é
    /// coletado em ordem antes da entrega.
    pub fn process_files_with<E, F>(&self, paths: &[PathBuf], mut sink: F) -> std::result::Result<(), E>
    where
        F: FnMut(DocumentOutcome) -> std::result::Result<(), E>,
    {
        if !self.parallel {
            for path in paths {
                sink(self.process_file(path))?;
            }
            return Ok(());
        }

        let batch = rayon::current_num_threads().max(1) * DOCUMENTS_PER_THREAD;
        for chunk in paths.chunks(batch) {
            let outcomes: Vec<DocumentOutcome> = chunk.par_iter().map(|p| self.process_file(p)).collect();
            for outcome in outcomes {
                sink(outcome)?;
            }
        }
        Ok(())
    }

    /// Processa os arquivos e coleta todos os resultados, na ordem dada.
    pub fn process_files(&self, paths: &[PathBuf]) -> Vec<DocumentOutcome> {
        let mut outcomes = Vec::with_capacity(paths.len());
        self.process_files_with(paths, |outcome| {
            outcomes.push(outcome);
            Ok::<(), Infallible>(())
        })
        .unwrap_or_else(|never| match never {});
        outcomes
    }

    /// Processa todos os arquivos de um diretório, ordenados pelo nome.
    pub fn process_dir(&self, dir: &Path) -> Result<Vec<DocumentOutcome>> {
        let paths = list_documents(dir)?;
        info!(dir = %dir.display(), documents = paths.len(), "processing corpus directory");
        Ok(self.process_files(&paths))
    }
}
