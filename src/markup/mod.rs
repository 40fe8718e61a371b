mod html;
mod node;
mod traits;

pub use html::HtmlParser;
pub use node::Node;
pub use traits::MarkupParser;

pub mod prelude {
    pub use super::{HtmlParser, MarkupParser, Node};
}
