//! # drugner-core: Features por Token para Taggers de Fármacos
//!
//! Este crate converte sentenças anotadas com entidades (nomes de fármacos em
//! textos biomédicos) em uma tabela de features por token, pronta para treinar
//! um tagger de sequência (CRF). Nenhum modelo é treinado aqui: o produto é o
//! arquivo de treino, e a prioridade é que ele seja **exato**. Um offset
//! errado ou uma tag desalinhada não gera erro algum, só corrompe o treino.
//!
//! ## Arquitetura do Sistema
//!
//! Pipeline linear, uma sentença por vez:
//!
//! 1.  **Entrada** ([`corpus`]): id, texto bruto e spans de entidades (offsets de caractere).
//! 2.  **Tokenização** ([`tokenizer`]): tokens com offsets inclusivos recuperados do texto.
//! 3.  **Alinhamento** ([`tagger`]): tag BIO de cada token contra os spans (`B-drug`, `I-drug`, `O`).
//! 4.  **Features** ([`features`]): vetor ordenado de features `nome=valor` por token,
//!     com contribuidores opcionais apoiados em [`lexicon`].
//! 5.  **Saída** ([`output`]): tabela no formato do crfsuite.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use drugner_core::{EntitySpan, FeaturePipeline, Sentence};
//!
//! let pipeline = FeaturePipeline::new();
//! let sentence = Sentence {
//!     id: "DDI-DrugBank.d1.s0".to_string(),
//!     text: "Take aspirin now".to_string(),
//!     spans: vec![EntitySpan::new(5, 11, "drug")],
//! };
//!
//! let record = pipeline.process_sentence(&sentence).unwrap();
//! assert_eq!(record.tokens[1].tag.label(), "B-drug");
//! assert_eq!(record.features[1].get("prefix3"), Some("asp"));
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: orquestrador que conecta todos os estágios.
//! - [`tokenizer`]: segmentação e recuperação de offsets.
//! - [`tagger`]: esquema BIO e alinhamento de spans.
//! - [`features`]: features fixas e contribuidores plugáveis.
//! - [`config`]: arquivo TOML que liga contribuidores e o modo estrito.

pub mod config;
pub mod corpus;
pub mod error;
pub mod features;
pub mod lexicon;
pub mod output;
pub mod pipeline;
pub mod tagger;
pub mod tokenizer;

pub use config::Config;
pub use corpus::{Document, Sentence};
pub use error::{Error, Result};
pub use features::{FeatureContributor, FeatureExtractor, FeatureVector};
pub use output::{write_record, OutputFormat, SentenceRecord};
pub use pipeline::{DocumentOutcome, FeaturePipeline};
pub use tagger::{tag_for, EntitySpan, SpanAligner, Tag, TaggedToken};
pub use tokenizer::{tokenize, Token};
