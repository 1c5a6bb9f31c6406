//! Semantic clustering of transcripts over sentence embeddings.
//!
//! Every transcript is embedded once, a full pairwise cosine-similarity matrix is
//! built, and transcripts are grouped by a single greedy pass: the first
//! unvisited transcript seeds a cluster and absorbs every later unvisited
//! transcript at least `threshold` similar to it. Absorbed transcripts never seed
//! a cluster of their own. The pass is order-dependent (two transcripts both close
//! to a third may still be split), so callers must supply a stable input order.

use crate::embedding;
use crate::error::Error;
use crate::topic::{Topic, TopicMap};
use crate::transcripts::Model as Transcript;
use log::*;

/// Cosine similarity of two vectors. Vectors of different lengths, empty
/// vectors, and zero vectors have similarity 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom > 0.0 {
        dot / denom
    } else {
        0.0
    }
}

/// Full symmetric similarity matrix; `matrix[i][j]` compares item `i` with item `j`.
pub fn similarity_matrix(embeddings: &[Vec<f32>]) -> Vec<Vec<f32>> {
    embeddings
        .iter()
        .map(|a| embeddings.iter().map(|b| cosine_similarity(a, b)).collect())
        .collect()
}

/// Name of the `n`th cluster opened by [`greedy_clusters`], counting from 1.
pub fn cluster_name(n: usize) -> String {
    format!("Topic_{n}")
}

/// Greedy single-pass partition of `titles` using a precomputed similarity matrix.
/// Pairs missing from the matrix count as dissimilar.
pub fn greedy_clusters(titles: &[String], similarities: &[Vec<f32>], threshold: f32) -> TopicMap {
    let mut clusters = TopicMap::new();
    let mut visited = vec![false; titles.len()];

    for seed in 0..titles.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;

        let mut meetings = vec![titles[seed].clone()];
        for other in (seed + 1)..titles.len() {
            let similarity = similarities
                .get(seed)
                .and_then(|row| row.get(other))
                .copied()
                .unwrap_or(0.0);
            if !visited[other] && similarity >= threshold {
                meetings.push(titles[other].clone());
                visited[other] = true;
            }
        }

        clusters.push(Topic {
            name: cluster_name(clusters.len() + 1),
            meetings,
        });
    }

    clusters
}

/// Embeds each transcript's full content, in input order.
pub async fn embed_transcripts(
    embedder: &dyn embedding::Provider,
    transcripts: &[Transcript],
) -> Result<Vec<Vec<f32>>, Error> {
    let contents: Vec<String> = transcripts.iter().map(|t| t.content.clone()).collect();
    debug!(
        "Embedding {} transcript(s) with provider {}",
        contents.len(),
        embedder.provider_id()
    );
    let embeddings = embedder.embed_all(&contents).await?;
    if embeddings.len() != contents.len() {
        warn!(
            "Provider {} returned {} embedding(s) for {} transcript(s)",
            embedder.provider_id(),
            embeddings.len(),
            contents.len()
        );
        return Err(meeting_ai::Error::Provider(format!(
            "expected {} embeddings, got {}",
            contents.len(),
            embeddings.len()
        ))
        .into());
    }
    Ok(embeddings)
}

/// Embeds and clusters `transcripts`. No transcripts means no provider calls and
/// an empty map.
pub async fn cluster_transcripts(
    embedder: &dyn embedding::Provider,
    transcripts: &[Transcript],
    threshold: f32,
) -> Result<TopicMap, Error> {
    if transcripts.is_empty() {
        return Ok(TopicMap::new());
    }

    let embeddings = embed_transcripts(embedder, transcripts).await?;
    let similarities = similarity_matrix(&embeddings);
    let titles: Vec<String> = transcripts.iter().map(|t| t.title.clone()).collect();

    let clusters = greedy_clusters(&titles, &similarities, threshold);
    info!(
        "Clustered {} transcript(s) into {} topic(s) at threshold {threshold}",
        titles.len(),
        clusters.len()
    );
    Ok(clusters)
}
