//! 终端读写
//!
//! 逐行读取用户输入；输入 `выход` 或读到 EOF 视为退出

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};

/// 退出命令
pub const EXIT_COMMAND: &str = "выход";

pub struct Console<R, W> {
    reader: R,
    writer: W,
}

/// 标准输入输出上的终端
pub type StdConsole = Console<BufReader<Stdin>, Stdout>;

impl StdConsole {
    pub fn stdio() -> Self {
        Console::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// 输出一行
    pub async fn say(&mut self, text: &str) -> std::io::Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    /// 显示提示并读取一行（去掉首尾空白）
    ///
    /// EOF 或退出命令返回 `None`
    pub async fn ask(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        self.writer.write_all(prompt.as_bytes()).await?;
        self.writer.write_all(b" > ").await?;
        self.writer.flush().await?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }

        let line = line.trim();
        if line.to_lowercase() == EXIT_COMMAND {
            return Ok(None);
        }
        Ok(Some(line.to_string()))
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}
