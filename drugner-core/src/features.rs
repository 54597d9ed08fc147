//! # Engenharia de Features para o CRF
//!
//! Para cada token, gera uma lista **ordenada** de features textuais
//! (`nome=valor`) consumida pelo treinador do crfsuite. A ordem é parte do
//! contrato: o treinador lê as features por posição/nome e nunca as reordena.
//!
//! ## Features fixas (sempre presentes, nesta ordem)
//!
//! 1. `form`, `suf3`, `len` do token atual
//! 2. `prefix1`, `suffix1`, `prefix2`, `suffix2`, `prefix3`, `suffix3`
//! 3. Contexto anterior: `formPrev`, `suf3Prev`, `lenPrev` ou o marcador `BoS`
//! 4. Contexto seguinte: `formNext`, `suf3Next`, `lenNext` ou o marcador `EoS`
//! 5. `capitalized=Yes|No`
//! 6. `has_punct=Yes|No`
//!
//! ## Contribuidores opcionais
//!
//! Features extras implementam [`FeatureContributor`] e são anexadas **depois**
//! das fixas, na ordem em que foram registradas. Incluir ou remover um
//! contribuidor nunca altera as features fixas.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::lexicon::{DrugLexicon, PartOfSpeech, SenseIndex};
use crate::tokenizer::Token;

/// Conjunto de pontuação considerado por `has_punct` e `npunct`.
pub const PUNCTUATION: &str = "!()-[]{};:'\"\\,<>./?@#$%^&*_~";

/// Uma feature: par `nome=valor` ou marcador sem valor (`BoS`, `EoS`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub value: Option<String>,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Features de um token, na ordem em que foram emitidas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub features: Vec<Feature>,
    /// Índice do token na sentença.
    pub token_index: usize,
}

impl FeatureVector {
    pub fn new(token_index: usize) -> Self {
        Self {
            features: Vec::new(),
            token_index,
        }
    }

    /// Anexa uma feature `nome=valor`.
    pub fn push(&mut self, name: impl Into<String>, value: impl fmt::Display) {
        self.features.push(Feature {
            name: name.into(),
            value: Some(value.to_string()),
        });
    }

    /// Anexa um marcador sem valor.
    pub fn push_marker(&mut self, name: impl Into<String>) {
        self.features.push(Feature {
            name: name.into(),
            value: None,
        });
    }

    /// Valor da primeira feature com esse nome.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.features
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.value.as_deref())
    }

    pub fn has_marker(&self, name: &str) -> bool {
        self.features.iter().any(|f| f.name == name && f.value.is_none())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features já formatadas como strings (`"form=aspirin"`, `"BoS"`...).
    pub fn to_strings(&self) -> Vec<String> {
        self.features.iter().map(Feature::to_string).collect()
    }
}

/// Fonte extra de features, anexada depois das features fixas.
///
/// Implementações devem ser determinísticas e só ler dados imutáveis, pois o
/// mesmo extrator é usado por várias threads ao mesmo tempo.
pub trait FeatureContributor: Send + Sync {
    /// Nome curto usado em logs e na configuração.
    fn name(&self) -> &str;

    /// Anexa as features do token `tokens[index]` em `out`.
    fn contribute(&self, tokens: &[Token], index: usize, out: &mut FeatureVector);
}

/// Extrator de features: as fixas seguidas dos contribuidores registrados.
#[derive(Clone, Default)]
pub struct FeatureExtractor {
    contributors: Vec<Arc<dyn FeatureContributor>>,
}

impl FeatureExtractor {
    /// Extrator só com as features fixas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra um contribuidor ao final da lista.
    pub fn with_contributor(mut self, contributor: Arc<dyn FeatureContributor>) -> Self {
        self.contributors.push(contributor);
        self
    }

    pub fn contributor_names(&self) -> Vec<&str> {
        self.contributors.iter().map(|c| c.name()).collect()
    }

    /// Gera um vetor de features por token, alinhado com `tokens`.
    pub fn extract(&self, tokens: &[Token]) -> Vec<FeatureVector> {
        (0..tokens.len())
            .map(|i| {
                let mut fv = extract_for_token(tokens, i);
                for contributor in &self.contributors {
                    contributor.contribute(tokens, i, &mut fv);
                }
                fv
            })
            .collect()
    }
}

impl fmt::Debug for FeatureExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureExtractor")
            .field("contributors", &self.contributor_names())
            .finish()
    }
}

/// Features fixas de toda a sentença, sem contribuidores.
pub fn extract_features(tokens: &[Token]) -> Vec<FeatureVector> {
    FeatureExtractor::new().extract(tokens)
}

/// Features fixas do token `i` em seu contexto.
pub fn extract_for_token(tokens: &[Token], i: usize) -> FeatureVector {
    let mut fv = FeatureVector::new(i);
    let word = tokens[i].text.as_str();

    // === Token atual ===
    fv.push("form", word);
    fv.push("suf3", last_chars(word, 3));
    fv.push("len", char_len(word));

    for n in 1..=3 {
        fv.push(format!("prefix{n}"), first_chars(word, n));
        fv.push(format!("suffix{n}"), last_chars(word, n));
    }

    // === Contexto ===
    if i > 0 {
        let prev = tokens[i - 1].text.as_str();
        fv.push("formPrev", prev);
        fv.push("suf3Prev", last_chars(prev, 3));
        fv.push("lenPrev", char_len(prev));
    } else {
        fv.push_marker("BoS");
    }

    if i + 1 < tokens.len() {
        let next = tokens[i + 1].text.as_str();
        fv.push("formNext", next);
        fv.push("suf3Next", last_chars(next, 3));
        fv.push("lenNext", char_len(next));
    } else {
        fv.push_marker("EoS");
    }

    // === Ortografia ===
    let capitalized = word.chars().next().is_some_and(char::is_uppercase);
    fv.push("capitalized", yes_no(capitalized));
    fv.push("has_punct", yes_no(word.chars().any(is_punct)));

    fv
}

fn char_len(word: &str) -> usize {
    word.chars().count()
}

/// Primeiros `n` caracteres; a palavra inteira se for mais curta.
fn first_chars(word: &str, n: usize) -> &str {
    match word.char_indices().nth(n) {
        Some((byte, _)) => &word[..byte],
        None => word,
    }
}

/// Últimos `n` caracteres; a palavra inteira se for mais curta.
fn last_chars(word: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match word.char_indices().rev().nth(n - 1) {
        Some((byte, _)) => &word[byte..],
        None => word,
    }
}

fn is_punct(c: char) -> bool {
    PUNCTUATION.contains(c)
}

/// Real com pelo menos uma casa decimal (`1.0`, `0.75`), como o treinador
/// sempre recebeu.
fn float_repr(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

// ============================================================================
// Contribuidores opcionais
// ============================================================================

/// `has_numbers=Yes|No`: o token contém algum dígito.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigitFeatures;

impl FeatureContributor for DigitFeatures {
    fn name(&self) -> &str {
        "digits"
    }

    fn contribute(&self, tokens: &[Token], index: usize, out: &mut FeatureVector) {
        let has_digit = tokens[index].text.chars().any(|c| c.is_ascii_digit());
        out.push("has_numbers", yes_no(has_digit));
    }
}

/// Contagens por token: `ncapitalized`, `ndigits`, `npunct`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharCounts;

impl FeatureContributor for CharCounts {
    fn name(&self) -> &str {
        "char_counts"
    }

    fn contribute(&self, tokens: &[Token], index: usize, out: &mut FeatureVector) {
        let word = &tokens[index].text;
        out.push("ncapitalized", word.chars().filter(|c| c.is_uppercase()).count());
        out.push("ndigits", word.chars().filter(|c| c.is_ascii_digit()).count());
        out.push("npunct", word.chars().filter(|c| is_punct(*c)).count());
    }
}

/// Pertença ao léxico de fármacos: `isDrug` (exata) e `isDrugLower` (sem caixa).
#[derive(Debug, Clone)]
pub struct LexiconMembership {
    lexicon: Arc<DrugLexicon>,
}

impl LexiconMembership {
    pub fn new(lexicon: Arc<DrugLexicon>) -> Self {
        Self { lexicon }
    }
}

impl FeatureContributor for LexiconMembership {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn contribute(&self, tokens: &[Token], index: usize, out: &mut FeatureVector) {
        let word = &tokens[index].text;
        out.push("isDrug", u8::from(self.lexicon.contains(word)));
        out.push("isDrugLower", u8::from(self.lexicon.contains_lowercase(word)));
    }
}

/// Similaridade Jaro-Winkler entre tokens curtos e o vizinho no léxico.
///
/// O vizinho é a entrada no ponto de inserção do token na lista ordenada.
/// Tokens com `max_len` caracteres ou mais recebem `UNKNOWN`.
#[derive(Debug, Clone)]
pub struct FuzzySimilarity {
    lexicon: Arc<DrugLexicon>,
    max_len: usize,
}

impl FuzzySimilarity {
    pub const DEFAULT_MAX_LEN: usize = 5;

    pub fn new(lexicon: Arc<DrugLexicon>, max_len: usize) -> Self {
        Self { lexicon, max_len }
    }
}

impl FeatureContributor for FuzzySimilarity {
    fn name(&self) -> &str {
        "fuzzy"
    }

    fn contribute(&self, tokens: &[Token], index: usize, out: &mut FeatureVector) {
        let word = tokens[index].text.as_str();
        let neighbor = (char_len(word) < self.max_len)
            .then(|| self.lexicon.neighbor(word))
            .flatten();
        match neighbor {
            Some(entry) => out.push("Jaro_similarity", float_repr(strsim::jaro_winkler(entry, word))),
            None => out.push("Jaro_similarity", "UNKNOWN"),
        }
    }
}

/// Fração de sentidos substantivos do token no índice léxico (`perc_name`).
///
/// Nomes de fármacos são substantivos; palavras desconhecidas recebem `0`.
/// Formas flexionadas contam os sentidos do lema ("drugs" usa "drug").
#[derive(Debug, Clone)]
pub struct NounRatio {
    senses: Arc<SenseIndex>,
}

impl NounRatio {
    pub fn new(senses: Arc<SenseIndex>) -> Self {
        Self { senses }
    }
}

impl FeatureContributor for NounRatio {
    fn name(&self) -> &str {
        "noun_ratio"
    }

    fn contribute(&self, tokens: &[Token], index: usize, out: &mut FeatureVector) {
        let word = &tokens[index].text;
        let total = self.senses.total(word);
        if total == 0 {
            out.push("perc_name", 0);
        } else {
            let nouns = self.senses.count(word, PartOfSpeech::Noun);
            out.push("perc_name", float_repr(nouns as f64 / total as f64));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn strings(fv: &FeatureVector) -> Vec<String> {
        fv.to_strings()
    }

    #[test]
    fn test_full_feature_order_middle_token() {
        let tokens = tokenize("Take aspirin now").unwrap();
        let features = extract_features(&tokens);
        assert_eq!(
            strings(&features[1]),
            vec![
                "form=aspirin", "suf3=rin", "len=7",
                "prefix1=a", "suffix1=n", "prefix2=as", "suffix2=in", "prefix3=asp", "suffix3=rin",
                "formPrev=Take", "suf3Prev=ake", "lenPrev=4",
                "formNext=now", "suf3Next=now", "lenNext=3",
                "capitalized=No", "has_punct=No",
            ]
        );
    }

    #[test]
    fn test_boundary_markers() {
        let tokens = tokenize("Take aspirin now").unwrap();
        let features = extract_features(&tokens);
        assert!(features[0].has_marker("BoS"));
        assert!(features[0].get("formPrev").is_none());
        assert_eq!(features[0].get("formNext"), Some("aspirin"));
        assert!(features[2].has_marker("EoS"));
        assert!(features[2].get("formNext").is_none());
        assert!(!features[1].has_marker("BoS"));
        assert!(!features[1].has_marker("EoS"));
    }

    #[test]
    fn test_single_token_sentence_has_both_markers() {
        let tokens = tokenize("Aspirin").unwrap();
        let features = extract_features(&tokens);
        assert_eq!(features.len(), 1);
        assert!(features[0].has_marker("BoS"));
        assert!(features[0].has_marker("EoS"));
        assert_eq!(features[0].len(), 13);
    }

    #[test]
    fn test_short_token_fallback() {
        let tokens = tokenize("a").unwrap();
        let fv = &extract_features(&tokens)[0];
        assert_eq!(fv.get("suf3"), Some("a"));
        assert_eq!(fv.get("prefix3"), Some("a"));
        assert_eq!(fv.get("suffix3"), Some("a"));
        assert_eq!(fv.get("prefix2"), Some("a"));
        assert_eq!(fv.get("len"), Some("1"));
    }

    #[test]
    fn test_empty_token_degrades_gracefully() {
        let tokens = vec![Token { text: String::new(), start: 0, end: 0, index: 0 }];
        let fv = &extract_features(&tokens)[0];
        assert_eq!(fv.get("form"), Some(""));
        assert_eq!(fv.get("suffix3"), Some(""));
        assert_eq!(fv.get("len"), Some("0"));
        assert_eq!(fv.get("capitalized"), Some("No"));
    }

    #[test]
    fn test_multibyte_affixes() {
        let tokens = tokenize("β-lactamase").unwrap();
        let fv = &extract_features(&tokens)[0];
        assert_eq!(fv.get("form"), Some("β"));
        assert_eq!(fv.get("len"), Some("1"));
        let fv = &extract_features(&tokens)[2];
        assert_eq!(fv.get("suf3"), Some("ase"));
        assert_eq!(fv.get("prefix2"), Some("la"));
        assert_eq!(fv.get("suf3Prev"), Some("-"));
    }

    #[test]
    fn test_capitalization_flag() {
        let tokens = tokenize("Drug drug").unwrap();
        let features = extract_features(&tokens);
        assert_eq!(features[0].get("capitalized"), Some("Yes"));
        assert_eq!(features[1].get("capitalized"), Some("No"));
    }

    #[test]
    fn test_punctuation_flag() {
        let tokens = vec![
            Token { text: "drug,".into(), start: 0, end: 4, index: 0 },
            Token { text: "a\\b".into(), start: 6, end: 8, index: 1 },
            Token { text: "drug".into(), start: 10, end: 13, index: 2 },
        ];
        let features = extract_features(&tokens);
        assert_eq!(features[0].get("has_punct"), Some("Yes"));
        assert_eq!(features[1].get("has_punct"), Some("Yes"));
        assert_eq!(features[2].get("has_punct"), Some("No"));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let tokens = tokenize("Co-administration of ketoconazole increases levels.").unwrap();
        assert_eq!(extract_features(&tokens), extract_features(&tokens));
    }

    #[test]
    fn test_contributors_append_after_fixed_features() {
        let tokens = tokenize("Give 5mg Aspirin").unwrap();
        let base = extract_features(&tokens);
        let extractor = FeatureExtractor::new()
            .with_contributor(Arc::new(DigitFeatures))
            .with_contributor(Arc::new(CharCounts));
        let extended = extractor.extract(&tokens);

        for (b, e) in base.iter().zip(&extended) {
            assert_eq!(&e.features[..b.len()], &b.features[..]);
            assert_eq!(e.len(), b.len() + 4);
        }
        assert_eq!(extended[1].get("has_numbers"), Some("Yes"));
        assert_eq!(extended[1].get("ndigits"), Some("1"));
        assert_eq!(extended[2].get("has_numbers"), Some("No"));
        assert_eq!(extended[2].get("ncapitalized"), Some("1"));
        assert_eq!(extractor.contributor_names(), vec!["digits", "char_counts"]);
    }

    #[test]
    fn test_lexicon_membership() {
        let lexicon = Arc::new(DrugLexicon::from_names(["Aspirin", "heparin"]));
        let extractor = FeatureExtractor::new().with_contributor(Arc::new(LexiconMembership::new(lexicon)));
        let tokens = tokenize("aspirin heparin now").unwrap();
        let features = extractor.extract(&tokens);
        assert_eq!(features[0].get("isDrug"), Some("0"));
        assert_eq!(features[0].get("isDrugLower"), Some("1"));
        assert_eq!(features[1].get("isDrug"), Some("1"));
        assert_eq!(features[2].get("isDrugLower"), Some("0"));
    }

    #[test]
    fn test_fuzzy_similarity() {
        let lexicon = Arc::new(DrugLexicon::from_names(["ASA", "heparin"]));
        let fuzzy = FuzzySimilarity::new(lexicon, FuzzySimilarity::DEFAULT_MAX_LEN);
        let tokens = tokenize("AS heparin").unwrap();
        let extractor = FeatureExtractor::new().with_contributor(Arc::new(fuzzy));
        let features = extractor.extract(&tokens);

        // "AS" < "ASA": o vizinho é "ASA"
        let expected = strsim::jaro_winkler("ASA", "AS").to_string();
        assert_eq!(features[0].get("Jaro_similarity"), Some(expected.as_str()));
        assert_eq!(features[1].get("Jaro_similarity"), Some("UNKNOWN"));
    }

    #[test]
    fn test_fuzzy_similarity_empty_lexicon() {
        let fuzzy = FuzzySimilarity::new(Arc::new(DrugLexicon::default()), 5);
        let tokens = tokenize("AS").unwrap();
        let mut fv = FeatureVector::new(0);
        fuzzy.contribute(&tokens, 0, &mut fv);
        assert_eq!(fv.get("Jaro_similarity"), Some("UNKNOWN"));
    }

    #[test]
    fn test_fuzzy_similarity_exact_match_keeps_decimal() {
        // "ASA" casa exatamente com o vizinho limitado à última entrada
        let fuzzy = FuzzySimilarity::new(Arc::new(DrugLexicon::from_names(["ASA"])), 5);
        let tokens = tokenize("ASA").unwrap();
        let mut fv = FeatureVector::new(0);
        fuzzy.contribute(&tokens, 0, &mut fv);
        assert_eq!(fv.get("Jaro_similarity"), Some("1.0"));
    }

    #[test]
    fn test_noun_ratio() {
        let mut senses = SenseIndex::new();
        senses.add_index(PartOfSpeech::Noun, "cold n 3 2 @ ~ 3 1 1 2 3\n");
        senses.add_index(PartOfSpeech::Adjective, "cold a 1 1 & 1 0 4\n");
        let contributor = NounRatio::new(Arc::new(senses));
        let tokens = tokenize("Cold xyz").unwrap();

        let mut fv = FeatureVector::new(0);
        contributor.contribute(&tokens, 0, &mut fv);
        assert_eq!(fv.get("perc_name"), Some("0.75"));

        let mut fv = FeatureVector::new(1);
        contributor.contribute(&tokens, 1, &mut fv);
        assert_eq!(fv.get("perc_name"), Some("0"));
    }

    #[test]
    fn test_noun_ratio_uses_lemma_of_plurals() {
        let mut senses = SenseIndex::new();
        senses.add_index(PartOfSpeech::Noun, "drug n 1 1 @ 1 0 1\nanticoagulant n 1 1 @ 1 0 2\n");
        let contributor = NounRatio::new(Arc::new(senses));
        let tokens = tokenize("drugs anticoagulants anticoagulant").unwrap();

        for i in 0..tokens.len() {
            let mut fv = FeatureVector::new(i);
            contributor.contribute(&tokens, i, &mut fv);
            assert_eq!(fv.get("perc_name"), Some("1.0"), "token {}", tokens[i].text);
        }
    }

    #[test]
    fn test_punctuation_flag_covers_every_symbol() {
        for c in PUNCTUATION.chars() {
            let tokens = vec![Token { text: format!("a{c}"), start: 0, end: 1, index: 0 }];
            assert_eq!(extract_features(&tokens)[0].get("has_punct"), Some("Yes"), "char {c:?}");
        }
        for c in ['+', '=', '|', '`', 'é', '1'] {
            let tokens = vec![Token { text: format!("a{c}"), start: 0, end: 1, index: 0 }];
            assert_eq!(extract_features(&tokens)[0].get("has_punct"), Some("No"), "char {c:?}");
        }
    }
}
