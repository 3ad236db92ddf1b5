use snafu::Snafu;
use warp::reject;

pub mod dispatch;
pub mod http_service;
pub mod response;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Body oversize: {}", size))]
    BodyOversize { size: usize },
}

impl reject::Reject for Error {}
