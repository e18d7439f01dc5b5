// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use imgcrawl::domain::models::archive_job::FetchOutcome;
use imgcrawl::domain::services::ServiceError;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::helpers::{
    archive_files, create_fetch_service, test_settings, wait_until_empty, zip_entry_names,
};

async fn mount_image(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// 部分失败时压缩包只包含成功的图片，编号连续
#[tokio::test]
async fn partial_failure_packs_successful_images() {
    let server = MockServer::start().await;
    mount_image(&server, "/a.jpg", b"first image").await;
    mount_image(&server, "/c.png", b"third image").await;
    Mock::given(method("GET"))
        .and(path("/b.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let service = create_fetch_service(&test_settings(dir.path()));
    let urls = vec![
        format!("{}/a.jpg", server.uri()),
        format!("{}/b.jpg", server.uri()),
        format!("{}/c.png", server.uri()),
    ];

    let job = service.fetch_and_pack(&urls).await.unwrap();

    assert_eq!(job.outcomes.len(), 3);
    assert_eq!(job.succeeded(), 2);
    assert!(!job.outcomes[1].is_success());
    assert_eq!(job.outcomes[1].url(), urls[1]);

    let failures = job.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains(&urls[1]));
    assert!(failures[0].contains("404"));

    let mut entries: Vec<&str> = job.entries();
    entries.sort();
    assert_eq!(entries.len(), 2);
    let mut numbers: Vec<&str> = entries
        .iter()
        .map(|e| e.trim_start_matches("image_").split('.').next().unwrap())
        .collect();
    numbers.sort();
    assert_eq!(numbers, vec!["1", "2"]);

    let bytes = std::fs::read(job.archive_path()).unwrap();
    let names = zip_entry_names(&bytes);
    assert_eq!(names, entries);

    let mut extensions: Vec<&str> = names
        .iter()
        .map(|name| name.rsplit('.').next().unwrap())
        .collect();
    extensions.sort();
    assert_eq!(extensions, vec!["jpg", "png"]);

    drop(job);
    assert!(archive_files(dir.path()).is_empty());
}

/// 全部失败时不留下压缩包，每个地址一条失败原因
#[tokio::test]
async fn all_failures_leave_no_archive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let service = create_fetch_service(&test_settings(dir.path()));
    let urls = vec![
        format!("{}/x.jpg", server.uri()),
        format!("{}/y.gif", server.uri()),
    ];

    let err = service.fetch_and_pack(&urls).await.unwrap_err();

    match err {
        ServiceError::AllDownloadsFailed { failures } => {
            assert_eq!(failures.len(), 2);
            assert!(failures[0].contains(&urls[0]));
            assert!(failures[1].contains(&urls[1]));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(archive_files(dir.path()).is_empty());
}

/// 非图片地址直接判定失败，不发起网络请求
#[tokio::test]
async fn non_image_url_is_never_fetched() {
    let server = MockServer::start().await;
    mount_image(&server, "/ok.webp", b"webp bytes").await;
    Mock::given(method("GET"))
        .and(path("/page.html"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let service = create_fetch_service(&test_settings(dir.path()));
    let urls = vec![
        format!("{}/page.html", server.uri()),
        format!("{}/ok.webp", server.uri()),
    ];

    let job = service.fetch_and_pack(&urls).await.unwrap();

    assert_eq!(job.entries(), vec!["image_1.webp"]);
    match &job.outcomes[0] {
        FetchOutcome::Failure { reason, .. } => {
            assert_eq!(reason, &format!("Invalid image URL: {}", urls[0]));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn empty_selection_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let service = create_fetch_service(&test_settings(dir.path()));

    let err = service.fetch_and_pack(&[]).await.unwrap_err();

    assert!(matches!(err, ServiceError::NoImagesSelected));
    assert!(archive_files(dir.path()).is_empty());
}

/// 下载请求带上目标站点的来源作为 Referer
#[tokio::test]
async fn requests_carry_origin_referer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/pic.png"))
        .and(header("referer", server.uri().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let service = create_fetch_service(&test_settings(dir.path()));
    let urls = vec![format!("{}/img/pic.png", server.uri())];

    let job = service.fetch_and_pack(&urls).await.unwrap();

    assert_eq!(job.succeeded(), 1);
}

/// 超过大小上限的图片计为失败
#[tokio::test]
async fn oversized_image_is_a_failure() {
    let server = MockServer::start().await;
    mount_image(&server, "/big.jpg", &[0u8; 4096]).await;
    mount_image(&server, "/small.jpg", &[1u8; 16]).await;

    let dir = tempfile::tempdir().unwrap();
    let mut settings = test_settings(dir.path());
    settings.download.max_image_bytes = 1024;
    let service = create_fetch_service(&settings);
    let urls = vec![
        format!("{}/big.jpg", server.uri()),
        format!("{}/small.jpg", server.uri()),
    ];

    let job = service.fetch_and_pack(&urls).await.unwrap();

    assert_eq!(job.entries(), vec!["image_1.jpg"]);
    let failures = job.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("exceeds size limit"));
}

/// 重复地址各自产生一个结果
#[tokio::test]
async fn duplicate_urls_each_yield_an_outcome() {
    let server = MockServer::start().await;
    mount_image(&server, "/same.gif", b"gif").await;

    let dir = tempfile::tempdir().unwrap();
    let service = create_fetch_service(&test_settings(dir.path()));
    let url = format!("{}/same.gif", server.uri());
    let urls = vec![url.clone(), url];

    let job = service.fetch_and_pack(&urls).await.unwrap();

    assert_eq!(job.outcomes.len(), 2);
    let mut entries = job.entries();
    entries.sort();
    assert_eq!(entries, vec!["image_1.gif", "image_2.gif"]);
}

/// 重定向的每一跳都要经过地址检查，指向内网的跳转不会被跟随
#[tokio::test]
async fn redirect_to_private_address_is_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hop.jpg"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "http://169.254.169.254/latest/meta-data.jpg"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/moved.gif"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/real.gif"))
        .mount(&server)
        .await;
    mount_image(&server, "/real.gif", b"gif bytes").await;

    let dir = tempfile::tempdir().unwrap();
    let mut settings = test_settings(dir.path());
    settings.security.block_private_networks = true;
    settings.security.allowed_hosts = vec!["127.0.0.1".to_string()];
    let service = create_fetch_service(&settings);
    let urls = vec![
        format!("{}/hop.jpg", server.uri()),
        format!("{}/moved.gif", server.uri()),
    ];

    let job = service.fetch_and_pack(&urls).await.unwrap();

    assert_eq!(job.entries(), vec!["image_1.gif"]);
    let failures = job.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with(&format!("Blocked {}", urls[0])));
    assert!(failures[0].contains("169.254.169.254"));

    let bytes = std::fs::read(job.archive_path()).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let mut entry = archive.by_name("image_1.gif").unwrap();
    let mut content = Vec::new();
    std::io::Read::read_to_end(&mut entry, &mut content).unwrap();
    assert_eq!(content, b"gif bytes");
}

/// 请求被取消时，进行中的下载随之中止，部分写入的压缩包被删除
#[tokio::test]
async fn cancelled_job_removes_partial_archive() {
    let server = MockServer::start().await;
    mount_image(&server, "/fast.png", b"fast").await;
    Mock::given(method("GET"))
        .and(path("/slow.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"slow".to_vec())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(create_fetch_service(&test_settings(dir.path())));
    let urls = vec![
        format!("{}/fast.png", server.uri()),
        format!("{}/slow.png", server.uri()),
    ];

    let job = {
        let service = service.clone();
        tokio::spawn(async move { service.fetch_and_pack(&urls).await })
    };
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(archive_files(dir.path()).len(), 1);

    job.abort();
    assert!(job.await.unwrap_err().is_cancelled());
    assert!(wait_until_empty(dir.path()).await);
}
