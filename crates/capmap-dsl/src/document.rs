//! Tagged document union and the four-document set
//!
//! A [`Document`] is what one YAML block deserializes into; the `kind` field
//! selects the variant. [`DocumentSet`] is the working graph every analysis
//! reads from.

use crate::id::DocKind;
use crate::types::{CjmDsl, EmDsl, OutcomeDsl, SbpDsl};
use serde::{Deserialize, Serialize};

/// One document of any kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Document {
    Cjm(CjmDsl),
    Sbp(SbpDsl),
    Outcome(OutcomeDsl),
    Em(EmDsl),
}

impl Document {
    /// Discriminator of this document
    #[inline]
    #[must_use]
    pub fn kind(&self) -> DocKind {
        match self {
            Document::Cjm(_) => DocKind::Cjm,
            Document::Sbp(_) => DocKind::Sbp,
            Document::Outcome(_) => DocKind::Outcome,
            Document::Em(_) => DocKind::Em,
        }
    }
}

/// The four (each optional) documents of one model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentSet {
    pub cjm: Option<CjmDsl>,
    pub sbp: Option<SbpDsl>,
    pub outcome: Option<OutcomeDsl>,
    pub em: Option<EmDsl>,
}

impl DocumentSet {
    /// Empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the CJM
    #[inline]
    #[must_use]
    pub fn with_cjm(mut self, cjm: CjmDsl) -> Self {
        self.cjm = Some(cjm);
        self
    }

    /// Builder: set the SBP
    #[inline]
    #[must_use]
    pub fn with_sbp(mut self, sbp: SbpDsl) -> Self {
        self.sbp = Some(sbp);
        self
    }

    /// Builder: set the Outcome
    #[inline]
    #[must_use]
    pub fn with_outcome(mut self, outcome: OutcomeDsl) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Builder: set the EM
    #[inline]
    #[must_use]
    pub fn with_em(mut self, em: EmDsl) -> Self {
        self.em = Some(em);
        self
    }

    /// Place a document in its slot, returning the one it replaced
    pub fn insert(&mut self, doc: Document) -> Option<Document> {
        match doc {
            Document::Cjm(d) => self.cjm.replace(d).map(Document::Cjm),
            Document::Sbp(d) => self.sbp.replace(d).map(Document::Sbp),
            Document::Outcome(d) => self.outcome.replace(d).map(Document::Outcome),
            Document::Em(d) => self.em.replace(d).map(Document::Em),
        }
    }

    /// Whether a document of `kind` is present
    #[must_use]
    pub fn contains(&self, kind: DocKind) -> bool {
        match kind {
            DocKind::Cjm => self.cjm.is_some(),
            DocKind::Sbp => self.sbp.is_some(),
            DocKind::Outcome => self.outcome.is_some(),
            DocKind::Em => self.em.is_some(),
        }
    }

    /// Number of present documents
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        DocKind::ALL.iter().filter(|k| self.contains(**k)).count()
    }

    /// True when no document is present
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Present documents in stream order (CJM, SBP, Outcome, EM)
    #[must_use]
    pub fn to_documents(&self) -> Vec<Document> {
        let mut docs = Vec::with_capacity(4);
        if let Some(d) = &self.cjm {
            docs.push(Document::Cjm(d.clone()));
        }
        if let Some(d) = &self.sbp {
            docs.push(Document::Sbp(d.clone()));
        }
        if let Some(d) = &self.outcome {
            docs.push(Document::Outcome(d.clone()));
        }
        if let Some(d) = &self.em {
            docs.push(Document::Em(d.clone()));
        }
        docs
    }
}

impl FromIterator<Document> for DocumentSet {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let mut set = DocumentSet::new();
        for doc in iter {
            set.insert(doc);
        }
        set
    }
}
