use voyage::{RequestClient, RequestError, RequestOptions};
use voyage_shared::protocol::{
    CityLookupRequest, ListToursRequest, PlaceDetailRequest, SuggestRequest, TourDetailRequest,
};
use voyage_shared::{
    ApiRequest, Envelope, HEADER_ACCEPT, MIME_JSON, Place, PlaceKind, Suggestion, SuggestionKind,
    Tour,
};

/// 旅游后端的强类型客户端
///
/// 所有请求都经过共享的 [`RequestClient`]，因此同样享有缓存、超时与错误钩子。
#[derive(Clone)]
pub struct TravelApi {
    requests: RequestClient,
}

impl TravelApi {
    pub fn new(requests: RequestClient) -> Self {
        Self { requests }
    }

    pub fn requests(&self) -> &RequestClient {
        &self.requests
    }

    /// 发送请求并拆开响应信封
    pub async fn send<R: ApiRequest>(&self, request: &R) -> Result<R::Response, RequestError> {
        let options = RequestOptions::new()
            .method(R::METHOD)
            .header(HEADER_ACCEPT, MIME_JSON);
        let envelope: Envelope<R::Response> = self
            .requests
            .request(&request.url(), options)
            .await?
            .into_typed()?;
        envelope.into_result().map_err(|message| {
            log::warn!("{} rejected: {}", request.path(), message);
            RequestError::Rejected(message)
        })
    }

    /// 获取线路列表
    pub async fn list_tours(&self, filter: ListToursRequest) -> Result<Vec<Tour>, RequestError> {
        self.send(&filter).await
    }

    /// 获取线路详情
    pub async fn tour(&self, id: &str) -> Result<Tour, RequestError> {
        self.send(&TourDetailRequest { id: id.to_string() }).await
    }

    /// 获取地点详情
    pub async fn place(&self, kind: PlaceKind, id: &str) -> Result<Place, RequestError> {
        self.send(&PlaceDetailRequest {
            kind,
            id: id.to_string(),
        })
        .await
    }

    /// 自动补全；空白输入不发请求
    pub async fn suggest(
        &self,
        kind: SuggestionKind,
        term: &str,
    ) -> Result<Vec<Suggestion>, RequestError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.send(&SuggestRequest {
            kind,
            term: term.to_string(),
        })
        .await
    }

    /// 按城市名与国家查询城市 ID
    pub async fn city_id(&self, name: &str, country: &str) -> Result<String, RequestError> {
        let city = self
            .send(&CityLookupRequest {
                name: name.to_string(),
                country: country.to_string(),
            })
            .await?;
        Ok(city.city_id)
    }
}
