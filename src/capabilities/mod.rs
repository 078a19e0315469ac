mod http;
mod kv;

pub use self::http::{
    Http, HttpError, HttpMethod, HttpOperation, HttpOutput, HttpRequest, HttpResponse, HttpResult,
    ValidatedUrl,
};
pub use self::kv::{KeyValue, KvError, KvKey, KvOperation, KvOutput, KvResult};

use self::kv::KeyValue as Kv;

// Crux's built-in Render capability covers view invalidation as-is.
pub use crux_core::render::Render;

use crate::event::Event;
use crate::App;

pub type AppHttp = Http<Event>;
pub type AppKv = KeyValue<Event>;
pub type AppRender = Render<Event>;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub kv: Kv<Event>,
    pub render: Render<Event>,
}
