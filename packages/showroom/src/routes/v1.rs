use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/categories", category_routes())
        .nest("/promotions", promotion_routes())
        .nest("/products", product_routes())
        .nest("/contacts", contact_routes())
        .nest("/gallery", gallery_routes())
        .nest("/videos", video_routes())
        .nest("/slides", slide_routes())
        .nest("/website-images", website_image_routes())
        .nest("/drafts", draft_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::auth::login))
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::category::list_categories,
            handlers::category::create_category
        ))
        .routes(routes!(handlers::category::delete_category))
}

fn promotion_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::promotion::list_promotions,
            handlers::promotion::create_promotion
        ))
        .routes(routes!(handlers::promotion::delete_promotion))
        .routes(routes!(handlers::promotion::replace_promotion_image))
        .routes(routes!(handlers::promotion::commit_promotion_image))
}

fn product_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::product::list_products,
            handlers::product::create_product
        ))
        .routes(routes!(
            handlers::product::update_product,
            handlers::product::delete_product
        ))
        .routes(routes!(handlers::product::replace_product_image))
        .routes(routes!(handlers::product::commit_product_image))
}

fn contact_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::contact::list_contacts,
            handlers::contact::create_contact
        ))
        .routes(routes!(
            handlers::contact::update_contact,
            handlers::contact::delete_contact
        ))
        .routes(routes!(handlers::contact::replace_contact_image))
        .routes(routes!(handlers::contact::commit_contact_image))
}

fn gallery_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::gallery::list_gallery,
            handlers::gallery::create_gallery_image
        ))
        .routes(routes!(
            handlers::gallery::update_gallery_image,
            handlers::gallery::delete_gallery_image
        ))
        .routes(routes!(handlers::gallery::replace_gallery_image))
        .routes(routes!(handlers::gallery::commit_gallery_image))
}

fn video_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::video::list_videos,
            handlers::video::create_video
        ))
        .routes(routes!(
            handlers::video::update_video,
            handlers::video::delete_video
        ))
}

fn slide_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::slide::list_slides,
            handlers::slide::create_slide,
            handlers::slide::save_slides
        ))
        .routes(routes!(handlers::slide::delete_slide))
}

fn website_image_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::website_image::list_website_images))
        .routes(routes!(handlers::website_image::put_website_image))
}

fn draft_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::draft::stage_draft,
        handlers::draft::abandon_draft
    ))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::maintenance::sweep))
}
