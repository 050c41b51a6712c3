//! End-to-end protocol tests: raw command lines in, wire bytes out.

mod common;

use common::mock_catalogue::track;
use common::TestContext;

#[tokio::test]
async fn test_search_returns_track_records() {
    let ctx = TestContext::new();
    ctx.catalogue.set_search_results(vec![track(
        "t1",
        "Comfortably Numb",
        "Pink Floyd",
        "The Wall",
        "a1",
        382,
    )]);

    let response = ctx.send("search any \"comfortably numb\"").await;
    assert_eq!(
        response,
        "file: t1\n\
         Time: 382\n\
         Artist: Pink Floyd\n\
         Title: Comfortably Numb\n\
         Album: The Wall\n\
         OK\n"
    );
}

#[tokio::test]
async fn test_playlistfind_unknown_id_acks() {
    let ctx = TestContext::new();
    let response = ctx.send("playlistfind filename \"no-such-id\"").await;
    assert_eq!(response, "ACK [50@0] {playlistfind}\n");
}

#[tokio::test]
async fn test_command_list_ok_mode() {
    let ctx = TestContext::new();
    ctx.send_quiet("command_list_ok_begin").await;
    ctx.send_quiet("add \"t1\"").await;
    ctx.send_quiet("add \"t2\"").await;
    let response = ctx.send("command_list_end").await;
    assert_eq!(response, "list_OK\nlist_OK\nOK\n");

    let playlist = ctx.send("playlist").await;
    assert_eq!(playlist, "0:file: t1\n1:file: t2\nOK\n");
}

#[tokio::test]
async fn test_command_list_stops_at_first_failure() {
    let ctx = TestContext::new();
    ctx.send_quiet("command_list_begin").await;
    ctx.send_quiet("addid \"t1\"").await;
    ctx.send_quiet("bogus").await;
    ctx.send_quiet("addid \"t2\"").await;
    let response = ctx.send("command_list_end").await;
    // First command's output survives; replay stops at the failure, with
    // the ACK index pointing at the offending buffered command.
    assert_eq!(response, "Id: 0\nACK [5@1] {} unknown command \"bogus\"\n");

    // The third command never ran.
    let playlist = ctx.send("playlist").await;
    assert_eq!(playlist, "0:file: t1\nOK\n");
}

#[tokio::test]
async fn test_status_stopped_playlist() {
    let ctx = TestContext::new();
    ctx.send("add \"t1\"").await;
    ctx.send("add \"t2\"").await;
    ctx.send("add \"t3\"").await;

    let response = ctx.send("status").await;
    assert_eq!(
        response,
        "playlist: 0\nplaylistlength: 3\nstate: stop\nOK\n"
    );
}

#[tokio::test]
async fn test_unknown_command_acks_with_empty_braces() {
    let ctx = TestContext::new();
    let response = ctx.send("frobnicate now").await;
    assert_eq!(response, "ACK [5@0] {} unknown command \"frobnicate\"\n");
}

#[tokio::test]
async fn test_addid_reports_playlist_index() {
    let ctx = TestContext::new();
    assert_eq!(ctx.send("addid \"t9\"").await, "Id: 0\nOK\n");
    assert_eq!(ctx.send("addid \"t8\"").await, "Id: 1\nOK\n");
}

#[tokio::test]
async fn test_playid_starts_playback_and_sets_cursor() {
    let ctx = TestContext::new();
    ctx.catalogue
        .add_track(track("t1", "Money", "Pink Floyd", "DSOTM", "a1", 382));
    ctx.send("add \"t1\"").await;

    assert_eq!(ctx.send("playid 0").await, "OK\n");
    assert_eq!(
        ctx.player.played_urls(),
        vec!["http://mock/stream/t1?device=test-device"]
    );

    let status = ctx.send("status").await;
    assert!(status.starts_with("playlist: 0\nplaylistlength: 1\nstate: play\n"));
    assert!(status.contains("song: 0\n"));
    assert!(status.contains("songid: 0\n"));
    assert!(status.contains("elapsed: 0.00\n"));
    assert!(status.contains("time: 0:00\n"));
}

#[tokio::test]
async fn test_playid_rejects_non_integer() {
    let ctx = TestContext::new();
    ctx.send("add \"t1\"").await;
    assert_eq!(ctx.send("playid abc").await, "ACK [2@0] {playid}\n");
}

#[tokio::test]
async fn test_playid_out_of_range_acks_no_exist() {
    let ctx = TestContext::new();
    ctx.send("add \"t1\"").await;
    assert_eq!(ctx.send("playid 5").await, "ACK [50@0] {playid}\n");
}

#[tokio::test]
async fn test_currentsong_empty_when_stopped() {
    let ctx = TestContext::new();
    ctx.send("add \"t1\"").await;
    assert_eq!(ctx.send("currentsong").await, "OK\n");
}

#[tokio::test]
async fn test_currentsong_reports_playing_track() {
    let ctx = TestContext::new();
    ctx.catalogue
        .add_track(track("t1", "Money", "Pink Floyd", "DSOTM", "a1", 382));
    ctx.send("add \"t1\"").await;
    ctx.send("playid 0").await;

    let response = ctx.send("currentsong").await;
    assert!(response.starts_with("file: t1\n"));
    assert!(response.contains("Title: Money\n"));
    assert!(response.ends_with("OK\n"));
}

#[tokio::test]
async fn test_playlistinfo_by_position() {
    let ctx = TestContext::new();
    ctx.catalogue
        .add_track(track("t2", "Time", "Pink Floyd", "DSOTM", "a1", 421));
    ctx.send("add \"t1\"").await;
    ctx.send("add \"t2\"").await;

    let response = ctx.send("playlistinfo 1").await;
    assert!(response.starts_with("file: t2\n"));
    assert!(response.contains("Pos: 1\nId: 1\n"));

    assert_eq!(ctx.send("playlistinfo 7").await, "ACK [50@0] {playlistinfo}\n");
    assert_eq!(ctx.send("playlistinfo x").await, "ACK [50@0] {playlistinfo}\n");
}

#[tokio::test]
async fn test_find_artist_uses_store_only() {
    let ctx = TestContext::new();
    // A search populates the store as a side effect.
    ctx.catalogue.set_search_results(vec![
        track("t1", "Money", "Pink Floyd", "DSOTM", "a1", 382),
        track("t2", "Heroes", "David Bowie", "Heroes", "a2", 371),
    ]);
    ctx.send("search any \"anything\"").await;

    // Store-only: works even with the remote gone.
    ctx.catalogue.set_offline(true);
    let response = ctx.send("find artist \"Pink Floyd\"").await;
    assert!(response.contains("file: t1\n"));
    assert!(!response.contains("file: t2\n"));
    assert!(response.ends_with("OK\n"));
}

#[tokio::test]
async fn test_find_album_resolves_learned_name() {
    let ctx = TestContext::new();
    ctx.catalogue.set_search_results(vec![track(
        "t1",
        "In the Flesh?",
        "Pink Floyd",
        "The Wall",
        "a1",
        199,
    )]);
    ctx.catalogue.add_album(cirrus::model::Album {
        id: "a1".to_string(),
        name: "The Wall".to_string(),
        artist: "Pink Floyd".to_string(),
        year: "1979".to_string(),
        tracks: vec![
            track("t1", "In the Flesh?", "Pink Floyd", "The Wall", "a1", 199),
            track("t2", "The Thin Ice", "Pink Floyd", "The Wall", "a1", 147),
        ],
    });

    // The search teaches the daemon that "The Wall" is album a1.
    ctx.send("search any \"the wall\"").await;
    let response = ctx.send("find album \"The Wall\"").await;
    assert!(response.contains("file: t1\n"));
    assert!(response.contains("file: t2\n"));
    assert!(response.ends_with("OK\n"));

    // Unknown names answer empty, not with an error.
    assert_eq!(ctx.send("find album \"No Such Album\"").await, "OK\n");
}

#[tokio::test]
async fn test_list_album_grouped_by_artist() {
    let ctx = TestContext::new();
    ctx.catalogue.set_search_results(vec![
        track("t1", "Money", "Pink Floyd", "DSOTM", "a1", 382),
    ]);
    ctx.catalogue.set_album_search_results(vec![cirrus::model::Album {
        id: "a1".to_string(),
        name: "DSOTM".to_string(),
        artist: "Pink Floyd".to_string(),
        year: "1973".to_string(),
        tracks: Vec::new(),
    }]);

    // Free query goes remote.
    let response = ctx.send("list album \"dark side\"").await;
    assert_eq!(response, "Album: DSOTM\nOK\n");

    // Albums are persisted, so the artist grouping answers from the store.
    ctx.catalogue.set_offline(true);
    let response = ctx.send("list album artist \"Pink Floyd\"").await;
    assert_eq!(response, "Album: DSOTM\nDate: 1973\nOK\n");
}

#[tokio::test]
async fn test_list_artists_from_store() {
    let ctx = TestContext::new();
    ctx.catalogue.set_album_search_results(vec![cirrus::model::Album {
        id: "a1".to_string(),
        name: "DSOTM".to_string(),
        artist: "Pink Floyd".to_string(),
        year: "1973".to_string(),
        tracks: Vec::new(),
    }]);
    ctx.send("list album \"dark\"").await;

    let response = ctx.send("list artist \"floyd\"").await;
    assert_eq!(response, "Artist: Pink Floyd\nOK\n");
}

#[tokio::test]
async fn test_lsinfo_lists_user_library() {
    let ctx = TestContext::new();
    ctx.catalogue.set_library(vec![track(
        "t1", "Money", "Pink Floyd", "DSOTM", "a1", 382,
    )]);
    let response = ctx.send("lsinfo").await;
    assert!(response.starts_with("file: t1\n"));
    assert!(response.ends_with("OK\n"));

    // Remote failure surfaces as a system error.
    ctx.catalogue.set_offline(true);
    assert_eq!(ctx.send("lsinfo").await, "ACK [52@0] {lsinfo}\n");
}

#[tokio::test]
async fn test_outputs_and_stats_and_listplaylists() {
    let ctx = TestContext::new();
    assert_eq!(
        ctx.send("outputs").await,
        "outputid: 0\noutputname: Cirrus Output\noutputenabled: 1\nOK\n"
    );
    assert_eq!(ctx.send("listplaylists").await, "OK\n");
    let stats = ctx.send("stats").await;
    assert!(stats.starts_with("uptime: "));
    assert!(stats.ends_with("OK\n"));
}

#[tokio::test]
async fn test_commands_listing() {
    let ctx = TestContext::new();
    let response = ctx.send("commands").await;
    assert!(response.contains("command: search\n"));
    assert!(response.contains("command: playid\n"));
    assert!(response.ends_with("OK\n"));

    let response = ctx.send("notcommands").await;
    assert!(response.contains("command: idle\n"));
}

#[tokio::test]
async fn test_stop_and_pause_report_stopped() {
    let ctx = TestContext::new();
    ctx.catalogue
        .add_track(track("t1", "Money", "Pink Floyd", "DSOTM", "a1", 382));
    ctx.send("add \"t1\"").await;
    ctx.send("playid 0").await;

    assert_eq!(ctx.send("pause").await, "OK\n");
    let status = ctx.send("status").await;
    assert!(status.contains("state: stop\n"));

    ctx.send("playid 0").await;
    assert_eq!(ctx.send("stop").await, "OK\n");
    let status = ctx.send("status").await;
    assert!(status.contains("state: stop\n"));
}

#[tokio::test]
async fn test_autoplay_advances_on_end_of_stream() {
    let ctx = TestContext::new();
    ctx.catalogue
        .add_track(track("t1", "One", "A", "X", "a1", 100));
    ctx.catalogue
        .add_track(track("t2", "Two", "A", "X", "a1", 100));
    ctx.send("add \"t1\"").await;
    ctx.send("add \"t2\"").await;
    ctx.send("playid 0").await;

    // Simulate the stream running out, as the audio backend would report.
    ctx.daemon.play_next().await;

    assert_eq!(
        ctx.player.played_urls(),
        vec![
            "http://mock/stream/t1?device=test-device",
            "http://mock/stream/t2?device=test-device",
        ]
    );
    let status = ctx.send("status").await;
    assert!(status.contains("song: 1\n"));
}
