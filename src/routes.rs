use crate::auth::{AuthService, TokenIssuer};
use crate::catalog::CatalogService;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::{AuthMiddleware, CurrentUser};
use crate::models::{NewOrder, ProductInput, SignInInput, SignUpInput};
use crate::notify::{self, Broadcaster};
use crate::orders::OrderService;
use crate::store::Store;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde_json::json;
use std::sync::Arc;

/// Shared services handed to every worker.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub broadcaster: Broadcaster,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn Store>) -> Self {
        let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl_hours);
        let broadcaster = Broadcaster::new(config.broadcast_capacity);
        let orders =
            OrderService::new(store.clone(), broadcaster.clone(), config.currency.clone())
                .with_total_verification(config.verify_order_totals);
        AppState {
            auth: AuthService::new(store.clone(), tokens),
            catalog: CatalogService::new(store),
            orders,
            broadcaster,
        }
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

async fn register(
    auth: web::Data<AuthService>,
    data: web::Json<SignUpInput>,
) -> Result<HttpResponse> {
    let response = auth.register(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

async fn login(auth: web::Data<AuthService>, data: web::Json<SignInInput>) -> Result<HttpResponse> {
    let response = auth.login(data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn list_products(catalog: web::Data<CatalogService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(catalog.list().await?))
}

async fn my_products(
    catalog: web::Data<CatalogService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(catalog.list_mine(&user.0).await?))
}

async fn create_product(
    catalog: web::Data<CatalogService>,
    user: CurrentUser,
    data: web::Json<ProductInput>,
) -> Result<HttpResponse> {
    let product = catalog.create(&user.0, data.into_inner()).await?;
    Ok(HttpResponse::Created().json(product))
}

async fn delete_product(
    catalog: web::Data<CatalogService>,
    user: CurrentUser,
    product_id: web::Path<String>,
) -> Result<HttpResponse> {
    catalog.delete(&user.0, &product_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Product removed" })))
}

async fn create_order(
    orders: web::Data<OrderService>,
    user: CurrentUser,
    data: web::Json<NewOrder>,
) -> Result<HttpResponse> {
    let order = orders.place_order(&user.0, data.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

async fn my_orders(orders: web::Data<OrderService>, user: CurrentUser) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(orders.my_orders(&user.0).await?))
}

/// Cross-origin policy for the browser client. `*` in `origins` allows any origin.
pub fn cors(origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "DELETE"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);
    if origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in origins {
            cors = cors.allowed_origin(origin);
        }
    }
    cors
}

/// Mounts the `/api` routes and their shared data.
pub fn configure(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let tokens = state.auth.tokens().clone();
        cfg.app_data(web::Data::new(state.auth))
            .app_data(web::Data::new(state.catalog))
            .app_data(web::Data::new(state.orders))
            .app_data(web::Data::new(state.broadcaster))
            .app_data(
                web::JsonConfig::default()
                    .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
            )
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(tokens))
                    .route("/health", web::get().to(health))
                    .route("/events", web::get().to(notify::events))
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(register))
                            .route("/login", web::post().to(login)),
                    )
                    .service(
                        web::scope("/products")
                            .route("/myproducts", web::get().to(my_products))
                            .route("/{id}", web::delete().to(delete_product))
                            .service(
                                web::resource("")
                                    .route(web::get().to(list_products))
                                    .route(web::post().to(create_product)),
                            ),
                    )
                    .service(
                        web::scope("/orders")
                            .route("/myorders", web::get().to(my_orders))
                            .service(web::resource("").route(web::post().to(create_order))),
                    ),
            );
    }
}
