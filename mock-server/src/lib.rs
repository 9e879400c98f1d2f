use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use chrono::{Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub const API_PREFIX: &str = "/backend/api/v1";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub rating: u8,
    pub review_text: String,
    pub ai_response: Option<String>,
    pub ai_summary: Option<String>,
    pub recommended_actions: Option<Vec<String>>,
    pub sentiment: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct CreateFeedback {
    pub rating: i64,
    pub review_text: String,
}

#[derive(Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeywordStat {
    pub keyword: String,
    pub count: u64,
    pub trend: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: String,
    pub count: u64,
    pub avg_rating: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecentTrend {
    pub change: f64,
    pub direction: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Analytics {
    pub total_reviews: u64,
    pub average_rating: f64,
    pub sentiment_distribution: SentimentCounts,
    pub rating_distribution: BTreeMap<u8, u64>,
    pub top_keywords: Vec<KeywordStat>,
    pub recent_trend: RecentTrend,
    pub reviews_over_time: Vec<DailyStats>,
    pub positive_percentage: f64,
    pub negative_count: u64,
}

/// In-memory feedback table with an auto-incrementing id.
#[derive(Debug, Default)]
pub struct Store {
    items: BTreeMap<i64, Feedback>,
    next_id: i64,
}

impl Store {
    pub fn insert(&mut self, rating: u8, review_text: &str, created_at: NaiveDateTime) -> Feedback {
        self.next_id += 1;
        let enrichment = enrich(rating, review_text);
        let item = Feedback {
            id: self.next_id,
            rating,
            review_text: review_text.to_string(),
            ai_response: Some(enrichment.response),
            ai_summary: Some(enrichment.summary),
            recommended_actions: Some(enrichment.actions),
            sentiment: Some(enrichment.sentiment.to_string()),
            keywords: Some(enrichment.keywords),
            created_at,
        };
        self.items.insert(item.id, item.clone());
        item
    }

    pub fn remove(&mut self, id: i64) -> Option<Feedback> {
        self.items.remove(&id)
    }

    /// Newest first.
    pub fn newest_first(&self) -> Vec<Feedback> {
        let mut items: Vec<Feedback> = self.items.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Knobs for simulating backend behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    /// Health checks answered with 503 before the server reports itself up.
    pub cold_start_checks: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    cold_checks_left: Arc<AtomicU32>,
}

impl AppState {
    pub fn new(options: Options) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::default())),
            cold_checks_left: Arc::new(AtomicU32::new(options.cold_start_checks)),
        }
    }
}

pub fn app() -> Router {
    app_with(AppState::new(Options::default()))
}

pub fn app_with(state: AppState) -> Router {
    let api = Router::new()
        .route("/feedback/", get(list_feedback).post(create_feedback))
        .route("/feedback/{id}", delete(delete_feedback))
        .route("/analytics/", get(get_analytics));
    Router::new()
        .route("/backend", get(root))
        .route("/backend/health", get(health))
        .nest(API_PREFIX, api)
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Options::default()).await
}

pub async fn run_with(listener: TcpListener, options: Options) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(AppState::new(options))).await
}

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

fn detail(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": message })))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the feedback dashboard API" }))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let was_cold = state
        .cold_checks_left
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
        .is_ok();
    if was_cold {
        debug!("health check while cold");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "starting" })));
    }
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

async fn create_feedback(State(state): State<AppState>, Json(input): Json<CreateFeedback>) -> ApiResult<Json<Feedback>> {
    let rating = u8::try_from(input.rating)
        .ok()
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| detail(StatusCode::UNPROCESSABLE_ENTITY, "Rating must be between 1 and 5"))?;
    if input.review_text.trim().is_empty() {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "Review text must not be empty"));
    }
    let item = state
        .store
        .write()
        .await
        .insert(rating, &input.review_text, Utc::now().naive_utc());
    info!(id = item.id, rating, "feedback created");
    Ok(Json(item))
}

async fn list_feedback(State(state): State<AppState>, Query(page): Query<Pagination>) -> Json<Vec<Feedback>> {
    let store = state.store.read().await;
    Json(store.newest_first().into_iter().skip(page.skip).take(page.limit).collect())
}

async fn delete_feedback(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    let removed = state.store.write().await.remove(id);
    match removed {
        Some(_) => {
            info!(id, "feedback deleted");
            Ok(Json(json!({ "id": id, "message": "Feedback deleted successfully" })))
        }
        None => Err(detail(StatusCode::NOT_FOUND, "Feedback not found")),
    }
}

async fn get_analytics(State(state): State<AppState>) -> Json<Analytics> {
    let store = state.store.read().await;
    Json(compute_analytics(&store.newest_first(), Utc::now().naive_utc()))
}

struct Enrichment {
    sentiment: &'static str,
    response: String,
    summary: String,
    actions: Vec<String>,
    keywords: Vec<String>,
}

/// Substring cues mapped to the topic keyword they stand for.
const TOPIC_CUES: &[(&str, &str)] = &[
    ("deliver", "delivery"),
    ("shipping", "delivery"),
    ("price", "pricing"),
    ("pricing", "pricing"),
    ("expensive", "pricing"),
    ("support", "customer support"),
    ("staff", "customer support"),
    ("quality", "product quality"),
    ("broken", "product quality"),
    ("packag", "packaging"),
    ("refund", "refunds"),
    ("website", "user experience"),
    ("checkout", "user experience"),
];

fn sentiment_for(rating: u8) -> &'static str {
    match rating {
        4..=5 => "positive",
        0..=2 => "negative",
        _ => "neutral",
    }
}

/// Deterministic stand-in for the LLM enrichment step.
fn enrich(rating: u8, review_text: &str) -> Enrichment {
    let lower = review_text.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();
    for (cue, keyword) in TOPIC_CUES {
        if lower.contains(cue) && !keywords.iter().any(|k| k == keyword) {
            keywords.push(keyword.to_string());
        }
    }
    let sentiment = sentiment_for(rating);
    let (response, actions) = match sentiment {
        "positive" => (
            "Thank you for the kind words! We're glad you enjoyed your experience.",
            vec!["Share the praise with the team".to_string()],
        ),
        "negative" => (
            "We're sorry to hear that. Our team will look into this right away.",
            vec![
                "Follow up with the customer".to_string(),
                "Investigate the reported issue".to_string(),
            ],
        ),
        _ => (
            "Thanks for your feedback! We'll use it to keep improving.",
            vec!["Review for improvement opportunities".to_string()],
        ),
    };
    Enrichment {
        sentiment,
        response: response.to_string(),
        summary: format!("Customer left a {sentiment} {rating}-star review."),
        actions,
        keywords,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn mean_rating<'a>(items: impl IntoIterator<Item = &'a Feedback>) -> f64 {
    let (sum, count) = items
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), f| (sum + u64::from(f.rating), count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// Aggregate statistics over `items` as of `now`.
pub fn compute_analytics(items: &[Feedback], now: NaiveDateTime) -> Analytics {
    if items.is_empty() {
        return empty_analytics();
    }

    let mut sentiment = SentimentCounts::default();
    let mut ratings: BTreeMap<u8, u64> = (1..=5).map(|r| (r, 0)).collect();
    let mut keyword_counts: Vec<(String, u64)> = Vec::new();

    for item in items {
        let label = item.sentiment.as_deref().unwrap_or_else(|| sentiment_for(item.rating));
        match label {
            "positive" => sentiment.positive += 1,
            "negative" => sentiment.negative += 1,
            _ => sentiment.neutral += 1,
        }
        *ratings.entry(item.rating).or_insert(0) += 1;
        for keyword in item.keywords.iter().flatten() {
            match keyword_counts.iter_mut().find(|(k, _)| k == keyword) {
                Some((_, count)) => *count += 1,
                None => keyword_counts.push((keyword.clone(), 1)),
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    keyword_counts.sort_by(|a, b| b.1.cmp(&a.1));
    let top_keywords = keyword_counts
        .into_iter()
        .take(10)
        .map(|(keyword, count)| KeywordStat {
            keyword,
            count,
            trend: "stable".to_string(),
        })
        .collect();

    let week_ago = now - Duration::days(7);
    let two_weeks_ago = now - Duration::days(14);
    let recent = mean_rating(items.iter().filter(|f| f.created_at >= week_ago));
    let previous = mean_rating(
        items
            .iter()
            .filter(|f| f.created_at >= two_weeks_ago && f.created_at < week_ago),
    );
    let change = recent - previous;
    let direction = if change > 0.1 {
        "up"
    } else if change < -0.1 {
        "down"
    } else {
        "stable"
    };

    let reviews_over_time = (0..14)
        .rev()
        .map(|days_back| {
            let day_start = (now - Duration::days(days_back))
                .date()
                .and_hms_opt(0, 0, 0)
                .unwrap_or(now);
            let day_end = day_start + Duration::days(1);
            let day: Vec<&Feedback> = items
                .iter()
                .filter(|f| f.created_at >= day_start && f.created_at < day_end)
                .collect();
            DailyStats {
                date: day_start.format("%b %d").to_string(),
                count: day.len() as u64,
                avg_rating: round_to(mean_rating(day.iter().copied()), 1),
            }
        })
        .collect();

    let total = items.len() as u64;
    let positive_percentage = if total == 0 {
        0.0
    } else {
        round_to(sentiment.positive as f64 / total as f64 * 100.0, 1)
    };

    Analytics {
        total_reviews: total,
        average_rating: round_to(mean_rating(items), 2),
        negative_count: sentiment.negative,
        sentiment_distribution: sentiment,
        rating_distribution: ratings,
        top_keywords,
        recent_trend: RecentTrend {
            change: round_to(change, 2),
            direction: direction.to_string(),
        },
        reviews_over_time,
        positive_percentage,
    }
}

/// No feedback yet: zero counts and an empty time series.
fn empty_analytics() -> Analytics {
    Analytics {
        total_reviews: 0,
        average_rating: 0.0,
        sentiment_distribution: SentimentCounts::default(),
        rating_distribution: (1..=5).map(|r| (r, 0)).collect(),
        top_keywords: Vec::new(),
        recent_trend: RecentTrend {
            change: 0.0,
            direction: "stable".to_string(),
        },
        reviews_over_time: Vec::new(),
        positive_percentage: 0.0,
        negative_count: 0,
    }
}
