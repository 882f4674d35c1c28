use anyhow::{anyhow, Result};

use tekstitv_core::page::HttpPageSource;
use tekstitv_core::{AppConfig, PageId, PageSource};

/// Fetch one page and print it, no terminal UI
pub async fn run(config: &AppConfig, number: &str, subpage: u16) -> Result<()> {
    let page = PageId::parse(number)
        .ok_or_else(|| anyhow!("invalid page number '{}' (expected 100-999)", number))?;
    if subpage == 0 {
        return Err(anyhow!("subpages are numbered from 1"));
    }

    let source = HttpPageSource::new(config)?;
    let response = source
        .fetch(page, subpage)
        .await
        .map_err(|e| anyhow!("{}", e))?;

    for line in &response.lines {
        println!("{}", line);
    }

    let mut footer = vec![format!("page {}", response.page)];
    if response.sub_page_count > 1 {
        footer.push(format!("subpage {}/{}", subpage, response.sub_page_count));
    }
    if let Some(prev) = response.prev_page {
        footer.push(format!("prev {}", prev));
    }
    if let Some(next) = response.next_page {
        footer.push(format!("next {}", next));
    }
    println!("-- {}", footer.join(", "));

    Ok(())
}
