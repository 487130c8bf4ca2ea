use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod date;
mod de;
pub mod protocol;

pub use date::Timestamp;
pub use protocol::{ApiRequest, HttpMethod};

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const API_PREFIX: &str = "/api";
pub const HEADER_ACCEPT: &str = "Accept";
pub const MIME_JSON: &str = "application/json";

// =========================================================
// 响应信封 (Response Envelope)
// =========================================================

/// 后端统一响应格式 `{ success, data|tour|tours|..., message? }`
///
/// 不同端点对载荷字段的命名不一致，这里通过别名统一收敛到 `data`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "de::default_true")]
    pub success: bool,
    #[serde(
        alias = "tour",
        alias = "tours",
        alias = "place",
        alias = "results",
        alias = "suggestions"
    )]
    pub data: Option<T>,
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// 拆出载荷；`success: false` 或缺少载荷时返回错误消息
    pub fn into_result(self) -> Result<T, String> {
        if !self.success {
            return Err(self
                .message
                .unwrap_or_else(|| "Request was not successful".to_string()));
        }
        self.data
            .ok_or_else(|| "Response did not contain any data".to_string())
    }
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    #[serde(default, alias = "day_number", alias = "dayNumber")]
    pub day: u32,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default, alias = "details")]
    pub description: Option<String>,
}

/// 旅游线路
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    #[serde(alias = "tour_id", alias = "tourId", deserialize_with = "de::id_string")]
    pub id: String,
    #[serde(alias = "title", alias = "tour_name", alias = "tourName")]
    pub name: String,
    #[serde(default, alias = "summary")]
    pub description: Option<String>,
    #[serde(
        default,
        alias = "cost",
        alias = "price_from",
        deserialize_with = "de::lenient_f64"
    )]
    pub price: Option<f64>,
    #[serde(default, alias = "currency_code")]
    pub currency: Option<String>,
    #[serde(default, alias = "duration", alias = "days")]
    pub duration_days: Option<u32>,
    #[serde(default, alias = "city", alias = "location")]
    pub destination: Option<String>,
    #[serde(default, alias = "country_name")]
    pub country: Option<String>,
    #[serde(default, alias = "image_url", alias = "cover", alias = "thumbnail")]
    pub image: Option<String>,
    #[serde(default, alias = "start_date", alias = "date")]
    pub departure_date: Option<String>,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
    #[serde(default, alias = "places")]
    pub stops: Vec<PlaceSummary>,
}

impl Tour {
    /// 解析出发日期；格式不识别时返回 None，由展示层回退到原始字符串
    pub fn departure(&self) -> Option<NaiveDate> {
        let raw = self.departure_date.as_deref()?;
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

/// 地点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    #[serde(alias = "hotels")]
    Hotel,
    #[serde(alias = "restaurants")]
    Restaurant,
    #[serde(alias = "attractions", alias = "sight")]
    Attraction,
    #[serde(alias = "cities")]
    City,
}

impl PlaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceKind::Hotel => "hotel",
            PlaceKind::Restaurant => "restaurant",
            PlaceKind::Attraction => "attraction",
            PlaceKind::City => "city",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim_end_matches('s') {
            "hotel" => Some(PlaceKind::Hotel),
            "restaurant" => Some(PlaceKind::Restaurant),
            "attraction" => Some(PlaceKind::Attraction),
            "citie" | "city" => Some(PlaceKind::City),
            _ => None,
        }
    }
}

/// 地点摘要（线路详情中的途经地点）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSummary {
    #[serde(alias = "place_id", deserialize_with = "de::id_string")]
    pub id: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default, alias = "type", alias = "place_type")]
    pub kind: Option<PlaceKind>,
}

/// 地点详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(alias = "place_id", deserialize_with = "de::id_string")]
    pub id: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default, alias = "type", alias = "place_type")]
    pub kind: Option<PlaceKind>,
    #[serde(default, alias = "summary")]
    pub description: Option<String>,
    #[serde(default, alias = "location")]
    pub address: Option<String>,
    #[serde(default, alias = "stars", deserialize_with = "de::lenient_f64")]
    pub rating: Option<f64>,
    #[serde(default, alias = "image_url", alias = "photo")]
    pub image: Option<String>,
}

/// 自动补全的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    City,
    Country,
    Hotel,
    Restaurant,
}

impl SuggestionKind {
    /// 对应的 URL 片段
    pub fn as_path_segment(&self) -> &'static str {
        match self {
            SuggestionKind::City => "cities",
            SuggestionKind::Country => "countries",
            SuggestionKind::Hotel => "hotels",
            SuggestionKind::Restaurant => "restaurants",
        }
    }
}

/// 自动补全候选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default, deserialize_with = "de::optional_id_string")]
    pub id: Option<String>,
    #[serde(alias = "name", alias = "title", alias = "value")]
    pub label: String,
    #[serde(default, alias = "country_name")]
    pub country: Option<String>,
}

/// 城市 ID 查询结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRef {
    #[serde(alias = "id", alias = "cityId", deserialize_with = "de::id_string")]
    pub city_id: String,
}
