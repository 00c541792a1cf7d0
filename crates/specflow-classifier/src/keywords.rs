//! Static keyword tables.
//!
//! Keywords are matched against lowercased, punctuation-stripped words.

/// Domain tag -> keywords that assign it.
pub const DOMAIN_KEYWORDS: &[(&str, &[&str])] = &[
  (
    "security",
    &[
      "auth",
      "authentication",
      "authorization",
      "jwt",
      "oauth",
      "password",
      "passwords",
      "encrypt",
      "encryption",
      "security",
      "secure",
      "token",
      "tokens",
      "permission",
      "permissions",
      "login",
      "csrf",
      "tls",
      "ssl",
    ],
  ),
  (
    "web",
    &[
      "web",
      "http",
      "https",
      "api",
      "apis",
      "rest",
      "graphql",
      "frontend",
      "backend",
      "server",
      "website",
      "browser",
      "html",
      "css",
      "jwt",
      "session",
      "sessions",
      "endpoint",
      "endpoints",
      "user",
      "users",
      "login",
    ],
  ),
  (
    "data",
    &[
      "database",
      "databases",
      "sql",
      "postgres",
      "mysql",
      "sqlite",
      "redis",
      "storage",
      "cache",
      "caching",
      "migration",
      "migrations",
      "schema",
      "etl",
      "query",
      "queries",
    ],
  ),
  (
    "ai",
    &[
      "ai",
      "ml",
      "llm",
      "model",
      "models",
      "training",
      "neural",
      "embedding",
      "embeddings",
      "inference",
    ],
  ),
  (
    "mobile",
    &["mobile", "ios", "android", "tablet", "smartphone"],
  ),
  (
    "infrastructure",
    &[
      "deploy",
      "deployment",
      "docker",
      "kubernetes",
      "k8s",
      "ci",
      "pipeline",
      "cloud",
      "aws",
      "terraform",
      "monitoring",
    ],
  ),
  (
    "performance",
    &[
      "performance",
      "latency",
      "throughput",
      "scalable",
      "scalability",
      "optimize",
      "optimization",
      "concurrency",
      "realtime",
    ],
  ),
];

/// Technical terms that are not tied to one domain.
///
/// Every domain keyword also counts as a technical term.
pub const GENERIC_TECHNICAL_TERMS: &[&str] = &[
  "system",
  "systems",
  "service",
  "services",
  "microservice",
  "microservices",
  "architecture",
  "integration",
  "protocol",
  "algorithm",
  "distributed",
  "async",
  "queue",
  "framework",
  "library",
  "module",
  "component",
  "interface",
  "sdk",
  "cli",
];

/// Words that join clauses.
pub const CLAUSE_CONNECTIVES: &[&str] = &["and", "then", "with", "while", "plus"];

/// Whether a word counts as a technical term.
pub fn is_technical_term(word: &str) -> bool {
  GENERIC_TECHNICAL_TERMS.contains(&word)
    || DOMAIN_KEYWORDS
      .iter()
      .any(|(_, keywords)| keywords.contains(&word))
}
