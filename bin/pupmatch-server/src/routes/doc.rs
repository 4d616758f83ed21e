use utoipa::OpenApi;

use crate::routes::adoptions::AdoptionsApi;
use crate::routes::dogs::DogsApi;
use crate::routes::health::HealthApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "pupmatch-server",
    description = "PupMatch dog catalog and adoption API",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(HealthApi::openapi());
    root.merge(DogsApi::openapi());
    root.merge(AdoptionsApi::openapi());
    root
}
