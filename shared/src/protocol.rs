use crate::{API_PREFIX, CityRef, Place, PlaceKind, Suggestion, SuggestionKind, Tour};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// 大小写不敏感地解析方法名（表单的 `method` 属性通常是小写）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            _ => None,
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// Responses are wrapped in [`crate::Envelope`] on the wire; `Response` is the payload type.
pub trait ApiRequest {
    /// The payload type carried by the response envelope.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// The URL path, relative to the API base URL.
    fn path(&self) -> String;

    /// Query parameters appended to the path.
    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Path plus encoded query string.
    fn url(&self) -> String {
        let query = self.query();
        if query.is_empty() {
            return self.path();
        }
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();
        format!("{}?{}", self.path(), encoded)
    }
}

// =========================================================
// Request Definitions
// =========================================================

/// List tours, optionally filtered by destination
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListToursRequest {
    pub destination: Option<String>,
    pub page: Option<u32>,
}

impl ApiRequest for ListToursRequest {
    type Response = Vec<Tour>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/tours", API_PREFIX)
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(destination) = &self.destination {
            query.push(("destination", destination.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        query
    }
}

/// Tour detail by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourDetailRequest {
    pub id: String,
}

impl ApiRequest for TourDetailRequest {
    type Response = Tour;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/tours/{}", API_PREFIX, self.id)
    }
}

/// Place detail by type + id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDetailRequest {
    pub kind: PlaceKind,
    pub id: String,
}

impl ApiRequest for PlaceDetailRequest {
    type Response = Place;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/places/{}/{}", API_PREFIX, self.kind.as_str(), self.id)
    }
}

/// Autocomplete suggestions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub kind: SuggestionKind,
    pub term: String,
}

impl ApiRequest for SuggestRequest {
    type Response = Vec<Suggestion>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/autocomplete/{}", API_PREFIX, self.kind.as_path_segment())
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("q", self.term.clone())]
    }
}

/// City id lookup by name + country
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityLookupRequest {
    pub name: String,
    pub country: String,
}

impl ApiRequest for CityLookupRequest {
    type Response = CityRef;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/cities/lookup", API_PREFIX)
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone()), ("country", self.country.clone())]
    }
}
