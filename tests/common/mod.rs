#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hqc_engine::collaborators::{ArticleStore, DataCollector, InMemoryArticleStore};
use hqc_engine::error::ProviderError;
use hqc_engine::provider::{AiProvider, AiRequest, AiResponse, ModelFamily, ProviderRegistry, TokenUsage};
use hqc_engine::{HotelData, Orchestrator, Settings};

pub const GOOD_ARTICLE: &str = "\
## Arriving at Hotel Sakura

We arrived for check-in at 3 pm on our anniversary getaway. When we opened the door, \
we stepped into a 32 sqm room and loved the view from the window. The room was quiet \
and the sheets felt soft.

## Dinner and the onsen

That evening we were delighted by the dinner menu, full of savory flavor. The onsen, \
the pool, the sauna and the lounge left us relaxed. A faint scent of cedar filled the hall.

## The next morning

The next morning the breakfast buffet impressed me. The station is 5 minutes away on foot, \
the hotel has 12 floors and 180 rooms, and the airport is 8 km away. Check-out was smooth.

## Pros and cons of Hotel Sakura

Pros: the bath. Cons: the rates are high, at $250 per night.

Q: Is parking available?
Q: Is breakfast included?
Q: Can guests arrive early?

Book now or check availability for Hotel Sakura.
";

pub const THIN_ARTICLE: &str = "\
Hotel Sakura has 180 rooms on 12 floors.

The onsen and the pool are open daily.
";

pub fn hotel(name: &str, hqc_score: Option<f64>) -> HotelData {
    HotelData {
        hotel_name: name.to_string(),
        address: "Kyoto".to_string(),
        features: vec!["open-air bath".to_string()],
        hqc_score,
        ..HotelData::default()
    }
}

/// Returns the same hotel data for any name, stamped with the requested name.
pub struct StubCollector {
    pub data: Option<HotelData>,
    pub calls: AtomicUsize,
}

impl StubCollector {
    pub fn scored(hqc_score: Option<f64>) -> Arc<Self> {
        Arc::new(Self {
            data: Some(hotel("Hotel Sakura", hqc_score)),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            data: None,
            calls: AtomicUsize::new(0),
        })
    }
}

impl DataCollector for StubCollector {
    fn collect_hotel_data(&self, hotel_name: &str, _location: &str) -> Option<HotelData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.data.clone().map(|mut d| {
            d.hotel_name = hotel_name.to_string();
            d
        })
    }
}

/// Replays scripted replies in order, then repeats `fallback`.
pub struct ScriptedProvider {
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    fallback: String,
}

impl ScriptedProvider {
    pub fn always(text: &str) -> Arc<Self> {
        Self::scripted(Vec::new(), text)
    }

    pub fn scripted(replies: Vec<Result<String, ProviderError>>, fallback: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            replies: Mutex::new(replies.into()),
            fallback: fallback.to_string(),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

impl AiProvider for ScriptedProvider {
    fn generate(&self, request: &AiRequest) -> Result<AiResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()));
        reply.map(|text| AiResponse {
            text,
            raw: serde_json::Value::Null,
            usage: TokenUsage::default(),
            model: request.model.clone(),
        })
    }
}

pub fn registry_for(provider: &Arc<ScriptedProvider>) -> ProviderRegistry {
    let openai = provider.clone();
    let claude = provider.clone();
    ProviderRegistry::new()
        .register(ModelFamily::OpenAiResponses, move |_| Box::new(openai.clone()))
        .register(ModelFamily::Claude, move |_| Box::new(claude.clone()))
}

pub fn orchestrator(
    settings: Settings,
    collector: Arc<StubCollector>,
    provider: &Arc<ScriptedProvider>,
    store: Arc<dyn ArticleStore>,
) -> Orchestrator {
    Orchestrator::builder(settings)
        .collector(collector)
        .store(store)
        .providers(registry_for(provider))
        .build()
        .unwrap()
}

pub fn memory_store() -> Arc<InMemoryArticleStore> {
    Arc::new(InMemoryArticleStore::new())
}
