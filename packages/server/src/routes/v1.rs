use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/datasets", dataset_routes())
        .nest("/files", file_routes(config))
        .nest("/providers", provider_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    use handlers::auth::*;

    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
        .routes(routes!(me))
}

fn dataset_routes() -> OpenApiRouter<AppState> {
    use handlers::dataset::*;

    OpenApiRouter::new()
        .routes(routes!(list_datasets, create_dataset))
        .routes(routes!(get_dataset, update_dataset, delete_dataset))
}

fn provider_routes() -> OpenApiRouter<AppState> {
    use handlers::provider::*;

    OpenApiRouter::new()
        .routes(routes!(list_providers, create_provider))
        .routes(routes!(get_provider, update_provider, delete_provider))
}

fn file_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    use handlers::file::*;

    let upload = OpenApiRouter::new()
        .routes(routes!(upload_files))
        .layer(upload_body_limit(config));

    OpenApiRouter::new()
        .routes(routes!(list_files))
        .routes(routes!(get_file, update_file, delete_file))
        .routes(routes!(download_file))
        .merge(upload)
}
