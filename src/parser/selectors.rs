//! CSS selectors for topic pages
//!
//! The markup is the site's server-rendered topic listing:
//!
//! ```html
//! <ul id="entry-item-list">
//!   <li data-author="ssg" data-favorite-count="12" data-id="1">
//!     <div class="content">entry text<br>second line</div>
//!     <footer>
//!       <a class="entry-author" href="/biri/ssg">ssg</a>
//!       <a class="entry-date permalink" href="/entry/1">15.02.1999</a>
//!     </footer>
//!   </li>
//! </ul>
//! <div class="pager" data-currentpage="1" data-pagecount="42">...</div>
//! ```

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse the fixed selector strings
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

/// Attribute on each entry `li` carrying the author nick
pub const AUTHOR_ATTR: &str = "data-author";

/// Attribute on each entry `li` carrying the favorite count
pub const FAVORITE_COUNT_ATTR: &str = "data-favorite-count";

/// Attribute on the pager carrying the total page count
pub const PAGE_COUNT_ATTR: &str = "data-pagecount";

lazy_static! {
    pub(crate) static ref ENTRY_LIST: Selector = parse_selector!("ul#entry-item-list");
    pub(crate) static ref ENTRY_ITEM: Selector = parse_selector!("#entry-item-list > li");
    pub(crate) static ref ENTRY_CONTENT: Selector = parse_selector!("div.content");
    pub(crate) static ref ENTRY_AUTHOR: Selector = parse_selector!(".entry-author");
    pub(crate) static ref ENTRY_DATE: Selector = parse_selector!("a.entry-date");
    pub(crate) static ref PAGER: Selector = parse_selector!("div.pager");
    pub(crate) static ref PAGER_LINK: Selector = parse_selector!("a");
}
