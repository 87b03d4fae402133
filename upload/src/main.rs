// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use anyhow::{Context as _, Result};
use fileshare_core::{Context, OsEnv};
use fileshare_file_read_tokio::TokioFileRead;
use fileshare_http_send_reqwest::ReqwestHttpSend;
use fileshare_upload::{create_file, upload, Session, Settings};
use log::info;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const PROMPT: &str = "Enter the path to the test file: ";

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("NODE_ENV").as_deref() != Ok("production") {
        // A missing .env is fine.
        let _ = dotenv::dotenv();
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);

    let settings = Settings::from_env(&ctx).context("failed to load settings")?;
    let session = Session::connect(&ctx, &settings)
        .await
        .context("failed to set up session")?;

    let path = prompt(PROMPT).await?;

    let file = create_file(&session, &path)
        .await
        .with_context(|| format!("failed to create remote file for {path}"))?;
    let summary = upload(&session, &file, &path)
        .await
        .with_context(|| format!("failed to upload {path}"))?;

    info!(
        "uploaded {} bytes in {} ranges to {}",
        summary.bytes,
        summary.ranges,
        file.client.name()
    );
    Ok(())
}

/// Print `message` and read one line from stdin without its line ending.
async fn prompt(message: &str) -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(message.as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read path from stdin")?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
