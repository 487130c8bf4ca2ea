//! 站点路由表

use voyage::router::Handler;
use voyage::{NavigationError, Router, RouterError};
use voyage_shared::PlaceKind;
use voyage_shared::protocol::ListToursRequest;

use crate::api::TravelApi;
use crate::views;

pub const NOT_FOUND_PATH: &str = "/404";

/// 注册所有页面
pub fn register(router: &Router, api: &TravelApi) -> Result<(), RouterError> {
    let base = router.base().to_string();

    let tours = api.clone();
    let tours_base = base.clone();
    router.route(
        "/",
        Handler::render(move |route| {
            let api = tours.clone();
            let base = tours_base.clone();
            async move {
                let filter = ListToursRequest {
                    destination: route.query.get("destination").cloned(),
                    page: route.query.get("page").and_then(|p| p.parse().ok()),
                };
                let tours = api.list_tours(filter).await?;
                Ok(views::tour_list(&base, &tours))
            }
        }),
    )?;

    let tour = api.clone();
    let tour_base = base.clone();
    let tour_handler = Handler::render(move |route| {
        let api = tour.clone();
        let base = tour_base.clone();
        async move {
            let id = route.params.get("id").unwrap_or_default();
            let tour = api.tour(id).await?;
            Ok(views::tour_detail(&base, &tour))
        }
    });
    #[cfg(target_arch = "wasm32")]
    let tour_handler = tour_handler.after_render(crate::web::enquiry_binding(
        api.requests().clone(),
    ));
    router.route("/tour/:id", tour_handler)?;

    let place = api.clone();
    router.route(
        "/place/:kind/:id",
        Handler::render(move |route| {
            let api = place.clone();
            async move {
                let raw_kind = route.params.get("kind").unwrap_or_default();
                let kind = PlaceKind::parse(raw_kind).ok_or_else(|| {
                    NavigationError::new(format!("Unknown place type \"{}\"", raw_kind))
                })?;
                let place = api.place(kind, route.params.get("id").unwrap_or_default()).await?;
                Ok(views::place_detail(&place))
            }
        }),
    )?;

    let search = api.clone();
    let search_base = base.clone();
    router.route(
        "/search",
        Handler::render(move |route| {
            let api = search.clone();
            let base = search_base.clone();
            async move {
                let kind = views::parse_suggestion_kind(route.query.get("kind").map(String::as_str));
                let term = route.query.get("q").cloned().unwrap_or_default();
                let results = api.suggest(kind, &term).await?;
                Ok(views::search_page(&base, kind, &term, &results))
            }
        }),
    )?;

    // 服务端渲染的静态片段
    router.route("/about", Handler::remote("/partials/about.html"))?;
    router.route(
        "/offers/:region",
        Handler::remote("/partials/offers/:region.html").no_cache(),
    )?;

    router.route(NOT_FOUND_PATH, Handler::template(views::not_found(&base)).without_loading())?;
    Ok(())
}
