//! `IntegratedEngine`: orchestrates normalization, fuzzy correction,
//! synonym expansion, hybrid BM25 retrieval, reranking, navigation
//! diversification, confidence calibration, and query caching into the
//! single `search()` entry point (spec 4.5).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use equisearch_core::{DocCategory, Document, EngineConfig, EquisearchError, EquisearchResult};
use equisearch_normalize::normalize_equip;
use equisearch_rerank::{
    build_core_query, classify_doc, compute_confidence, confidence_level, diversify,
    is_navigation_intent, parse_query, rerank, ConfidenceLevel, ConfidenceParams, ParsedQuery,
    RerankedItem,
};
use equisearch_retrieve::{BM25Index, FuzzyConfig, FuzzyMatcher, HybridParams, SynonymExpander};

use crate::api::{Confidence, ResponseMetadata, ResultItem, SearchRequest, SearchResponse};
use crate::cache::{CachedSearch, QueryCache};
use crate::persistence;
use crate::providers::{CrossEncoderProvider, EmbeddingProvider};

/// How many times wider than `top_k` each synonym variant's BM25 search
/// reaches before the per-variant results are unioned (spec 4.5 step 5).
const CANDIDATE_MULTIPLIER: usize = 5;

const ENGINE_NAME: &str = "equisearch";
const ENGINE_VERSION: &str = "1";

/// The published, read-only search engine. Construct once via
/// [`IntegratedEngine::build`] or [`IntegratedEngine::load_or_build`];
/// every query thereafter is read-only except for the mutex-guarded
/// result cache (spec section 5).
pub struct IntegratedEngine {
    bm25: BM25Index,
    fuzzy: FuzzyMatcher,
    synonyms: SynonymExpander,
    documents: HashMap<String, Document>,
    config: EngineConfig,
    cache: Mutex<QueryCache>,
    request_counter: AtomicU64,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    cross_encoder_provider: Option<Arc<dyn CrossEncoderProvider>>,
}

impl IntegratedEngine {
    /// Build BM25 + fuzzy vocabulary from `corpus` from scratch.
    pub fn build(corpus: Vec<Document>, config: EngineConfig) -> EquisearchResult<Self> {
        crate::data::load_static_tables();
        if corpus.is_empty() {
            return Err(EquisearchError::CorpusMalformed("corpus has no documents".to_string()));
        }
        let index_docs: Vec<(String, String)> =
            corpus.iter().map(|d| (d.id.clone(), d.text.clone())).collect();
        let bm25 = BM25Index::build(&index_docs, HybridParams::default())
            .map_err(|e| EquisearchError::InternalInvariantViolation(e.to_string()))?;
        let fuzzy = FuzzyMatcher::build(vocabulary_tokens(&corpus), FuzzyConfig::default());
        Self::assemble(bm25, fuzzy, corpus, config)
    }

    /// Load a persisted index if it checksum-verifies and matches the
    /// live corpus size; otherwise build from scratch and persist the
    /// result at `index_path` (spec 4.10).
    pub fn load_or_build(
        corpus: Vec<Document>,
        config: EngineConfig,
        index_path: &std::path::Path,
    ) -> EquisearchResult<Self> {
        crate::data::load_static_tables();
        if corpus.is_empty() {
            return Err(EquisearchError::CorpusMalformed("corpus has no documents".to_string()));
        }
        if let Some((bm25, fuzzy)) = persistence::load(index_path, corpus.len()) {
            return Self::assemble(bm25, fuzzy, corpus, config);
        }
        let engine = Self::build(corpus, config)?;
        if let Err(e) = persistence::save(index_path, &engine.bm25, &engine.fuzzy, engine.documents.len()) {
            tracing::warn!(error = %e, "failed to persist rebuilt index, continuing without it");
        }
        Ok(engine)
    }

    fn assemble(
        bm25: BM25Index,
        fuzzy: FuzzyMatcher,
        corpus: Vec<Document>,
        config: EngineConfig,
    ) -> EquisearchResult<Self> {
        let documents = corpus.into_iter().map(|d| (d.id.clone(), d)).collect();
        Ok(Self {
            bm25,
            fuzzy,
            synonyms: SynonymExpander::with_defaults(),
            documents,
            config,
            cache: Mutex::new(QueryCache::new(512)),
            request_counter: AtomicU64::new(0),
            embedding_provider: None,
            cross_encoder_provider: None,
        })
    }

    pub fn with_embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    pub fn with_cross_encoder_provider(mut self, provider: Arc<dyn CrossEncoderProvider>) -> Self {
        self.cross_encoder_provider = Some(provider);
        self
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Invalidate the query cache, e.g. after swapping in a rebuilt
    /// engine (spec: "cache... invalidated on index rebuild").
    pub fn clear_cache(&self) {
        self.cache.lock().expect("cache mutex poisoned").clear();
    }

    /// Persist this engine's BM25 and fuzzy indexes to `path`, for
    /// `load_or_build` to pick up on a later run.
    pub fn save_index(&self, path: &std::path::Path) -> EquisearchResult<()> {
        persistence::save(path, &self.bm25, &self.fuzzy, self.documents.len())
    }

    /// Validate and run a wire-level [`SearchRequest`], applying
    /// `min_score` to the normalized score after the full pipeline runs.
    pub fn search_request(&self, request: &SearchRequest) -> EquisearchResult<SearchResponse> {
        let mut response = self.search(&request.query, request.top_k)?;
        if request.min_score > 0.0 {
            response.resultados.retain(|item| item.score_normalized >= request.min_score);
            response.total = response.resultados.len();
        }
        Ok(response)
    }

    /// Run the full search pipeline for `query`, returning at most
    /// `top_k` ranked results.
    pub fn search(&self, query: &str, top_k: usize) -> EquisearchResult<SearchResponse> {
        if query.trim().is_empty() {
            return Err(EquisearchError::InputValidation("query must not be empty".to_string()));
        }
        if top_k == 0 || top_k > self.config.max_top_k {
            return Err(EquisearchError::InputValidation(format!(
                "top_k must be between 1 and {}",
                self.config.max_top_k
            )));
        }

        let started = std::time::Instant::now();
        let q_norm = normalize_equip(query);
        if q_norm.is_empty() {
            return Err(EquisearchError::InputValidation("query normalized to empty string".to_string()));
        }

        let cache_key = QueryCache::key(&q_norm, top_k);
        let cached = self.cache.lock().expect("cache mutex poisoned").get(&cache_key);

        let (candidates, query_corrected, synonym_expansion_count, cache_hit) = match cached {
            Some(hit) => (hit.candidates, hit.query_corrected, hit.synonym_expansion_count, true),
            None => {
                let correction = self.fuzzy.correct_query(&q_norm);
                let q_fixed = correction.corrected.clone();
                let parsed_for_query = parse_query(&q_fixed);
                let core_query = build_core_query(&parsed_for_query);
                let variants = self.synonyms.expand(&core_query);

                let mut union: HashMap<String, f32> = HashMap::new();
                let search_k = (top_k * CANDIDATE_MULTIPLIER).max(top_k);
                for variant in &variants {
                    let Ok(hits) = self.bm25.search(variant, search_k) else { continue };
                    for (doc_id, score) in hits {
                        union
                            .entry(doc_id)
                            .and_modify(|best| *best = best.max(score))
                            .or_insert(score);
                    }
                }
                let mut candidates: Vec<(String, f32)> = union.into_iter().collect();
                candidates.sort_by(|a, b| {
                    b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(&b.0))
                });

                let query_corrected = correction.has_corrections.then_some(q_fixed);
                let synonym_expansion_count = variants.len().saturating_sub(1);

                self.cache.lock().expect("cache mutex poisoned").insert(
                    cache_key,
                    CachedSearch {
                        candidates: candidates.clone(),
                        query_corrected: query_corrected.clone(),
                        synonym_expansion_count,
                    },
                );

                (candidates, query_corrected, synonym_expansion_count, false)
            }
        };

        let q_fixed = query_corrected.clone().unwrap_or_else(|| q_norm.clone());
        let parsed = parse_query(&q_fixed);

        let mut items: Vec<RerankedItem> = if self.config.reranker_enabled {
            rerank(&candidates, |id| self.documents.get(id), &parsed, &self.config).items
        } else {
            unreranked_items(&candidates, &self.documents, &parsed)
        };

        let navigation_applied = self.config.nav_intent_enabled
            && is_navigation_intent(&parsed)
            && parsed.main_category.is_some();

        let final_items: Vec<RerankedItem> = if navigation_applied {
            let category = parsed.main_category.unwrap_or(DocCategory::Unknown);
            diversify(&items, |id| self.documents.get(id).cloned(), category, top_k, &self.config)
        } else {
            items.into_iter().take(top_k).collect()
        };

        let scores: Vec<f32> = final_items.iter().map(|i| i.rank_score_final).collect();
        let confidences = compute_confidence(
            &scores,
            &parsed,
            ConfidenceParams {
                temperature: self.config.confidence_temperature,
                use_specificity: self.config.confidence_use_specificity,
            },
        );

        let top1_confidence = confidences.first().copied().unwrap_or(0.0);
        let nivel = match confidence_level(top1_confidence) {
            ConfidenceLevel::Alta => "alta",
            ConfidenceLevel::Media => "media",
            ConfidenceLevel::Baixa => "baixa",
        };

        let mut resultados = Vec::with_capacity(final_items.len());
        for (item, confidence_item) in final_items.iter().zip(confidences.iter()) {
            let Some(doc) = self.documents.get(&item.doc_id) else { continue };
            resultados.push(ResultItem {
                grupo: doc.equipment_id.clone(),
                descricao: doc.title.clone(),
                score: item.bm25_norm,
                score_normalized: item.bm25_norm,
                score_breakdown: None,
                rank_score_final: item.rank_score_final,
                confidence_item: *confidence_item,
                metrics: doc.metrics,
                sources: doc.sources.clone(),
                marca: doc.sources.marcas.iter().next().cloned(),
                link_detalhes: format!("/equipamentos/{}", doc.id),
            });
        }

        let mut features = vec!["bm25_hybrid".to_string()];
        if query_corrected.is_some() {
            features.push("fuzzy_correction".to_string());
        }
        if synonym_expansion_count > 0 {
            features.push("synonym_expansion".to_string());
        }
        if self.config.reranker_enabled {
            features.push("reranker".to_string());
        }
        if navigation_applied {
            features.push("nav_diversifier".to_string());
        }

        let request_id = format!("req-{}", self.request_counter.fetch_add(1, Ordering::Relaxed));
        let total = resultados.len();

        Ok(SearchResponse {
            query_original: query.to_string(),
            query_corrected,
            resultados,
            total,
            confianca: Confidence { score: top1_confidence, nivel: nivel.to_string() },
            metadata: ResponseMetadata {
                engine: ENGINE_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                latency_ms: started.elapsed().as_millis() as u64,
                cache_hit,
                features,
                request_id,
            },
        })
    }
}

fn vocabulary_tokens(corpus: &[Document]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut tokens = Vec::new();
    for doc in corpus {
        for token in doc.text.split_whitespace() {
            if seen.insert(token.to_string()) {
                tokens.push(token.to_string());
            }
        }
    }
    tokens
}

/// Fallback ordering used when the reranker is disabled: document
/// classification is still attached (the response schema needs it) but
/// `rankScoreFinal` is just the BM25-normalized score.
fn unreranked_items(
    candidates: &[(String, f32)],
    documents: &HashMap<String, Document>,
    parsed: &ParsedQuery,
) -> Vec<RerankedItem> {
    let mut items: Vec<RerankedItem> = candidates
        .iter()
        .filter_map(|(doc_id, bm25_norm)| {
            let doc = documents.get(doc_id)?;
            let classification = classify_doc(doc, &parsed.model_numbers);
            Some(RerankedItem {
                doc_id: doc_id.clone(),
                bm25_norm: *bm25_norm,
                rank_score_final: *bm25_norm,
                classification,
            })
        })
        .collect();
    items.sort_by(|a, b| b.rank_score_final.partial_cmp(&a.rank_score_final).unwrap_or(std::cmp::Ordering::Equal));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use equisearch_core::{
        DocCategory as Cat, DocType, MaintenanceMetrics, MaintenanceUnit, Metrics, NumericMetrics, Sources,
    };

    fn doc(id: &str, title: &str, text: &str, category: Cat, doc_type: DocType) -> Document {
        let metric = NumericMetrics { display: 100.0, mean: 100.0, median: 100.0, min: 50.0, max: 150.0, n: 3 };
        Document {
            id: id.to_string(),
            equipment_id: text.to_string(),
            title: title.to_string(),
            text: text.to_string(),
            raw_text: title.to_string(),
            semantic_text: title.to_string(),
            doc_category: category,
            doc_type,
            metrics: Metrics {
                valor_unitario: metric,
                vida_util_meses: metric,
                manutencao: MaintenanceMetrics { metrics: metric, unit: MaintenanceUnit::Fraction },
            },
            sources: Sources::default(),
        }
    }

    fn sample_corpus() -> Vec<Document> {
        vec![
            doc(
                "DOC_00001",
                "Mop Industrial Microfibra 60cm",
                "mop industrial microfibra 60cm",
                Cat::Mop,
                DocType::Equipamento,
            ),
            doc(
                "DOC_00002",
                "Aspirador de Po Industrial 1400w",
                "aspirador de po industrial 1400w",
                Cat::Aspirador,
                DocType::Equipamento,
            ),
            doc(
                "DOC_00003",
                "Enceradeira de Piso 510 mm",
                "enceradeira de piso 510 mm",
                Cat::Enceradeira,
                DocType::Equipamento,
            ),
            doc(
                "DOC_00004",
                "Disco para Enceradeira 510",
                "disco para enceradeira 510",
                Cat::Unknown,
                DocType::Acessorio,
            ),
        ]
    }

    #[test]
    fn empty_query_is_rejected() {
        let engine = IntegratedEngine::build(sample_corpus(), EngineConfig::default()).unwrap();
        assert!(engine.search("   ", 10).is_err());
    }

    #[test]
    fn out_of_range_top_k_is_rejected() {
        let engine = IntegratedEngine::build(sample_corpus(), EngineConfig::default()).unwrap();
        assert!(engine.search("mop", 0).is_err());
        assert!(engine.search("mop", 1000).is_err());
    }

    #[test]
    fn typo_and_synonym_resolve_to_right_document() {
        let engine = IntegratedEngine::build(sample_corpus(), EngineConfig::default()).unwrap();
        let response = engine.search("aspiradro industrial", 5).unwrap();
        assert_eq!(response.resultados[0].grupo, "aspirador de po industrial 1400w");
        assert_eq!(response.query_corrected.as_deref(), Some("aspirador industrial"));
    }

    #[test]
    fn equipment_vs_accessory_guard_ranks_equipment_first() {
        let engine = IntegratedEngine::build(sample_corpus(), EngineConfig::default()).unwrap();
        let response = engine.search("enceradeira 510 c/ discos", 5).unwrap();
        assert_eq!(response.resultados[0].grupo, "enceradeira de piso 510 mm");
    }

    #[test]
    fn accessory_only_intent_ranks_accessory_first() {
        let engine = IntegratedEngine::build(sample_corpus(), EngineConfig::default()).unwrap();
        let response = engine.search("disco para enceradeira 510", 5).unwrap();
        assert_eq!(response.resultados[0].grupo, "disco para enceradeira 510");
    }

    #[test]
    fn second_identical_query_is_a_cache_hit() {
        let engine = IntegratedEngine::build(sample_corpus(), EngineConfig::default()).unwrap();
        let first = engine.search("mop industrial", 5).unwrap();
        let second = engine.search("mop industrial", 5).unwrap();
        assert!(!first.metadata.cache_hit);
        assert!(second.metadata.cache_hit);
    }

    #[test]
    fn confidence_values_are_non_increasing_and_in_unit_interval() {
        let engine = IntegratedEngine::build(sample_corpus(), EngineConfig::default()).unwrap();
        let response = engine.search("industrial", 5).unwrap();
        let mut prev = f32::INFINITY;
        for item in &response.resultados {
            assert!((0.0..=1.0).contains(&item.confidence_item));
            assert!(item.confidence_item <= prev + 1e-6);
            prev = item.confidence_item;
        }
    }
}
