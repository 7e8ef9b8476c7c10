//! Catalog rows shared by the engine tests.

use common::search_result::CatalogItem;
use serde_json::json;


/// Five AI models. `stars` is deliberately stored as a mix of numbers and
/// strings, one of which is not numeric at all.
pub fn model_fixture() -> Vec<CatalogItem> {
    vec![
        json!({
            "id": "mistral-7b", "name": "Mistral 7B", "description": "Dense decoder-only model",
            "category": "LLM", "organization": "Mistral", "tier": "free",
            "access_types": ["open-weights", "api"],
            "downloads": 5000, "likes": 300, "parameters": 7, "stars": "800", "created_at": "2023-09-27",
        }),
        json!({
            "id": "llama-3", "name": "Llama 3", "description": "Open foundation chat model from Meta",
            "category": "LLM", "organization": "Meta", "tier": "free",
            "access_types": ["open-weights"],
            "downloads": 90000, "likes": 2000, "parameters": 70, "stars": 2500, "created_at": "2024-04-18",
        }),
        json!({
            "id": "gpt-4o", "name": "GPT-4o", "description": "Multimodal flagship chat model",
            "category": "LLM", "organization": "OpenAI", "tier": "pro",
            "access_types": ["api", "hosted"],
            "downloads": 500, "likes": 1500, "parameters": null, "stars": "bad", "created_at": "2024-05-13",
        }),
        json!({
            "id": "sdxl", "name": "Stable Diffusion XL", "description": "Latent diffusion text-to-image model",
            "category": "Image", "organization": "Stability", "tier": "free",
            "access_types": ["open-weights"],
            "downloads": 40000, "likes": 900, "parameters": 3.5, "stars": "1,200", "created_at": "2023-07-26",
        }),
        json!({
            "id": "falcon-180b", "name": "Falcon 180B", "description": "Large open model trained on RefinedWeb",
            "category": "LLM", "organization": "TII", "tier": "enterprise",
            "access_types": ["open-weights", "hosted"],
            "downloads": 1000, "likes": 100, "parameters": 180, "stars": 45, "created_at": "2023-09-06",
        }),
    ]
    .into_iter()
    .map(CatalogItem::from)
    .collect()
}

/// Three rows whose popularity is stored as `"bad"`, `5` and `"1,200"`,
/// listed least popular first.
pub fn mixed_popularity_fixture() -> Vec<CatalogItem> {
    vec![
        json!({ "id": "gamma", "name": "Gamma", "stars": "bad", "created_at": "2024-01-03" }),
        json!({ "id": "beta", "name": "Beta", "stars": 5, "created_at": "2024-01-02" }),
        json!({ "id": "alpha", "name": "Alpha", "stars": "1,200", "created_at": "2024-01-01" }),
    ]
    .into_iter()
    .map(CatalogItem::from)
    .collect()
}

pub fn ids(items: &[CatalogItem]) -> Vec<String> {
    items.iter().filter_map(|item| item.text("id")).collect()
}
