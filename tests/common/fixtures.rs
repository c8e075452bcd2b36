//! Shared texts and gateway builders for integration tests.

#![allow(dead_code)]

use matchscore::embedding::MockEmbeddingGateway;

pub const RESUME: &str = "<h1>Jane Doe</h1>\
    <p>Senior backend engineer. Experienced Python developer with API design skills.</p>\
    <ul><li>Built REST APIs &amp; gRPC services</li><li>Kubernetes, Terraform</li></ul>";

pub const JOB: &str = "We are hiring a backend engineer with Python, API design, \
    Docker and Kubernetes experience.";

pub const UNRELATED: &str = "Pastry chef wanted for a busy downtown bakery.";

/// Gateway with fixed vectors: resume and job nearly aligned, unrelated orthogonal.
pub fn scripted_gateway() -> MockEmbeddingGateway {
    MockEmbeddingGateway::new()
        .with_vector(RESUME, vec![0.9, 0.3, 0.1, 0.0])
        .with_vector(JOB, vec![0.8, 0.4, 0.2, 0.0])
        .with_vector(UNRELATED, vec![0.0, 0.0, 0.0, 1.0])
}
