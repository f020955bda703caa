//! Common test utilities: topic page builders and a quiet crawler

#![allow(dead_code)]

use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use eksi_scraper::crawler::{PageFetcher, PolitenessDelay, TopicCrawler};
use eksi_scraper::utils::retry::RetryConfig;

/// One well-formed entry `li`
pub fn entry_html(page: u32, index: u32) -> String {
    format!(
        r#"<li data-id="{page}{index:03}" data-author="yazar-{page}-{index}" data-author-id="{index}"
               data-favorite-count="{index}" data-isfavorite="false">
             <div class="content">
               sayfa {page}, entry {index}<br/>
               (bkz: <a class="b" href="/?q=rust">rust</a>)
             </div>
             <footer>
               <div class="info">
                 <a class="entry-date permalink" href="/entry/{page}{index:03}">
                   0{page}.02.2020 14:{index:02}
                 </a>
                 <a class="entry-author" href="/biri/yazar-{page}-{index}">yazar-{page}-{index}</a>
               </div>
             </footer>
           </li>"#
    )
}

/// An entry missing its content block
pub fn malformed_entry_html() -> String {
    r#"<li data-id="999" data-author="bozuk" data-favorite-count="1">
         <footer><a class="entry-date permalink" href="/entry/999">01.01.2020</a></footer>
       </li>"#
        .to_string()
}

/// A topic page holding `entries` and an optional pager
pub fn topic_page(entries: &[String], current: u32, page_count: Option<u32>) -> String {
    let pager = match page_count {
        Some(count) => format!(
            r#"<div class="pager" data-currentpage="{current}" data-pagecount="{count}"></div>"#
        ),
        None => String::new(),
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="tr">
<head><meta charset="utf-8"><title>rust - ekşi sözlük</title></head>
<body>
  <div id="topic">
    <h1 id="title" data-title="rust" data-id="5432"><a href="/rust--5432">rust</a></h1>
    {pager}
    <ul id="entry-item-list" class="topic-list">
      {}
    </ul>
    {pager}
  </div>
</body>
</html>"#,
        entries.join("\n")
    )
}

/// A full page `page` of a topic with `count` entries
pub fn numbered_page(page: u32, count: u32, page_count: Option<u32>) -> String {
    let entries: Vec<String> = (1..=count).map(|i| entry_html(page, i)).collect();
    topic_page(&entries, page, page_count)
}

/// Crawler with no politeness delay and millisecond backoff
pub fn quiet_crawler(max_retries: u32, max_pages: u32) -> TopicCrawler {
    let fetcher = PageFetcher::with_config(
        1000,
        RetryConfig::with_delays(max_retries, 1, 10),
        Duration::from_secs(5),
    )
    .expect("fetcher");
    TopicCrawler::with_parts(fetcher, PolitenessDelay::none(), max_pages)
}

/// An address nothing is listening on
pub fn closed_port_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("local addr")
}
