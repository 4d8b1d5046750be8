//! Line-oriented interactive surface over the controller.

use anyhow::Result;
use client_core::{ProductApi, ProductListController};
use shared::domain::ProductId;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::render::render;

pub const HELP: &str = "\
commands:
  refresh            reload the product list
  name <text>        set the name field
  price <text>       set the price field
  submit             add, or update the product being edited
  edit <id>          load a product into the form
  cancel             stop editing
  delete <id>        delete a product
  help               show this text
  quit               exit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Refresh,
    SetName(String),
    SetPrice(String),
    Submit,
    Edit(ProductId),
    Cancel,
    Delete(ProductId),
    Help,
    Quit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "refresh" | "list" => Self::Refresh,
            "name" => Self::SetName(rest.to_string()),
            "price" => Self::SetPrice(rest.to_string()),
            "submit" | "save" => Self::Submit,
            "edit" => Self::Edit(parse_id(rest)?),
            "cancel" => Self::Cancel,
            "delete" | "rm" => Self::Delete(parse_id(rest)?),
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}

fn parse_id(raw: &str) -> Option<ProductId> {
    raw.trim_start_matches('#').parse().ok().map(ProductId)
}

/// Applies one command and returns the text to show, or `None` to exit.
pub async fn apply<A: ProductApi>(
    controller: &ProductListController<A>,
    command: ShellCommand,
) -> Option<String> {
    match command {
        ShellCommand::Refresh => controller.fetch_all().await,
        ShellCommand::SetName(name) => controller.set_draft_name(name).await,
        ShellCommand::SetPrice(price) => controller.set_draft_price(price).await,
        ShellCommand::Submit => controller.submit().await,
        ShellCommand::Edit(id) => {
            if !controller.begin_edit_id(id).await {
                return Some(format!("no product #{id} in the list\n"));
            }
        }
        ShellCommand::Cancel => controller.cancel_edit().await,
        ShellCommand::Delete(id) => controller.delete(id).await,
        ShellCommand::Help => return Some(HELP.to_string()),
        ShellCommand::Quit => return None,
    }
    Some(render(&controller.snapshot().await))
}

pub async fn run<A, R, W>(
    controller: &ProductListController<A>,
    input: R,
    mut output: W,
) -> Result<()>
where
    A: ProductApi,
    R: tokio::io::AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    controller.start().await;
    output
        .write_all(render(&controller.snapshot().await).as_bytes())
        .await?;
    output.write_all(b"type 'help' for commands\n").await?;
    output.flush().await?;

    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = ShellCommand::parse(&line) else {
            tracing::debug!(input = %line, "shell: unrecognized command");
            output.write_all(HELP.as_bytes()).await?;
            output.flush().await?;
            continue;
        };
        match apply(controller, command).await {
            Some(screen) => output.write_all(screen.as_bytes()).await?,
            None => break,
        }
        output.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use async_trait::async_trait;
    use shared::{domain::Product, protocol::ProductPayload};
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct MemoryApi {
        rows: Mutex<Vec<Product>>,
    }

    #[async_trait]
    impl ProductApi for MemoryApi {
        async fn list_products(&self) -> Result<Vec<Product>> {
            Ok(self.rows.lock().await.clone())
        }

        async fn create_product(&self, payload: &ProductPayload) -> Result<Product> {
            let mut rows = self.rows.lock().await;
            let product = payload.clone().into_product(ProductId(rows.len() as i64 + 1));
            rows.push(product.clone());
            Ok(product)
        }

        async fn update_product(&self, id: ProductId, payload: &ProductPayload) -> Result<()> {
            let mut rows = self.rows.lock().await;
            let row = rows
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| anyhow!("404 Not Found"))?;
            row.name = payload.name.clone();
            row.price = payload.price;
            Ok(())
        }

        async fn delete_product(&self, id: ProductId) -> Result<()> {
            self.rows.lock().await.retain(|p| p.id != id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn session_adds_and_edits_until_quit() {
        let controller = ProductListController::new(MemoryApi::default());
        let script = b"name Widget\nprice 9.99\nsubmit\nedit 1\nprice 12\nsave\nbogus\nquit\nname ignored\n";
        let mut screen = Vec::new();

        run(&controller, &script[..], &mut screen).await.expect("run");

        let screen = String::from_utf8(screen).expect("utf8");
        assert!(screen.contains("#1 Widget - $9.99"));
        assert!(screen.contains("<Update Product> (editing #1)"));
        assert!(screen.contains("#1 Widget - $12.00"));
        assert!(screen.contains("quit               exit"));
        let state = controller.snapshot().await;
        assert_eq!(state.draft.name, "");
        assert_eq!(state.products.len(), 1);
    }

    #[tokio::test]
    async fn editing_unknown_id_reports_it() {
        let controller = ProductListController::new(MemoryApi::default());
        let text = apply(&controller, ShellCommand::Edit(ProductId(5)))
            .await
            .expect("continue");
        assert_eq!(text, "no product #5 in the list\n");
        assert!(apply(&controller, ShellCommand::Quit).await.is_none());
    }

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(ShellCommand::parse("refresh"), Some(ShellCommand::Refresh));
        assert_eq!(
            ShellCommand::parse("name  Gaming Mouse "),
            Some(ShellCommand::SetName("Gaming Mouse".into()))
        );
        assert_eq!(
            ShellCommand::parse("price 9.99"),
            Some(ShellCommand::SetPrice("9.99".into()))
        );
        assert_eq!(ShellCommand::parse("name"), Some(ShellCommand::SetName(String::new())));
        assert_eq!(ShellCommand::parse("EDIT #3"), Some(ShellCommand::Edit(ProductId(3))));
        assert_eq!(ShellCommand::parse("delete 12"), Some(ShellCommand::Delete(ProductId(12))));
        assert_eq!(ShellCommand::parse("quit"), Some(ShellCommand::Quit));
    }

    #[test]
    fn rejects_unknown_words_and_bad_ids() {
        assert_eq!(ShellCommand::parse("frobnicate"), None);
        assert_eq!(ShellCommand::parse("delete"), None);
        assert_eq!(ShellCommand::parse("edit abc"), None);
    }
}
