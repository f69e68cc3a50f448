mod common;
mod pipeline;
mod routing;
