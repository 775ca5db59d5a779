mod common;

use common::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn rejected_login_closes_the_connection() {
    let (addr, _root) = start_server("reject", (41000, 41010), false).await;
    let mut client = connect(addr).await;

    let reply = client.cmd("USER bob").await;
    assert_eq!(reply, "331 Please specify the password");

    let reply = client.cmd("PASS wrong").await;
    assert!(reply.starts_with("530 Error:"), "got: {}", reply);

    // The server closes the control connection after a failed login.
    assert_eq!(client.read_line().await, "");
}

#[tokio::test]
async fn upload_download_delete_roundtrip() {
    let (addr, root) = start_server("roundtrip", (41100, 41200), false).await;
    let mut client = connect(addr).await;
    login(&mut client).await;

    assert_eq!(client.cmd("TYPE I").await, "200 Type set to I");

    // Upload.
    let reply = client.cmd("EPSV").await;
    let port = epsv_port(&reply);
    let mut data = open_data(port).await;
    client.send("STOR hello.bin").await;
    assert_eq!(client.read_line().await, "150 Opening data connection.");
    data.write_all(b"hello, world\n").await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    assert_eq!(client.read_line().await, "226 Transfer complete");

    assert_eq!(client.cmd("SIZE hello.bin").await, "213 13");
    assert!(root.join("hello.bin").is_file());

    // Download.
    let reply = client.cmd("EPSV").await;
    let port = epsv_port(&reply);
    let mut data = open_data(port).await;
    client.send("RETR hello.bin").await;
    assert_eq!(client.read_line().await, "150 Opening data connection.");
    let mut payload = Vec::new();
    data.read_to_end(&mut payload).await.unwrap();
    assert_eq!(payload, b"hello, world\n");
    assert_eq!(client.read_line().await, "226 Transfer complete");

    assert_eq!(client.cmd("DELE hello.bin").await, "250 File deleted.");
    assert!(!root.join("hello.bin").exists());
}

#[tokio::test]
async fn path_escape_is_rejected() {
    let (addr, _root) = start_server("escape", (41250, 41260), false).await;
    let mut client = connect(addr).await;
    login(&mut client).await;

    let reply = client.cmd("CWD ../..").await;
    assert_eq!(
        reply,
        "550 Error: access denied: path is outside the root directory"
    );

    // The session is still usable.
    assert_eq!(client.cmd("PWD").await, "257 \"/\" is current directory");
}

#[tokio::test]
async fn rename_sequence() {
    let (addr, root) = start_server("rename", (41300, 41310), false).await;
    std::fs::write(root.join("old.txt"), b"contents").unwrap();

    let mut client = connect(addr).await;
    login(&mut client).await;

    let reply = client.cmd("RNFR old.txt").await;
    assert_eq!(reply, "350 File exists, ready for destination name");
    let reply = client.cmd("RNTO new.txt").await;
    assert_eq!(reply, "250 File renamed successfully.");

    assert!(!root.join("old.txt").exists());
    assert_eq!(std::fs::read(root.join("new.txt")).unwrap(), b"contents");

    // RNTO without a fresh RNFR is a sequence error.
    assert_eq!(
        client.cmd("RNTO other.txt").await,
        "503 Bad sequence of commands."
    );

    // Any command between RNFR and RNTO voids the pending rename.
    assert_eq!(
        client.cmd("RNFR new.txt").await,
        "350 File exists, ready for destination name"
    );
    client.cmd("NOOP").await;
    assert_eq!(
        client.cmd("RNTO stale.txt").await,
        "503 Bad sequence of commands."
    );
}

#[tokio::test]
async fn rest_is_acknowledged_but_offset_not_applied() {
    let (addr, root) = start_server("rest", (41350, 41400), false).await;
    std::fs::write(root.join("data.bin"), b"abcdef").unwrap();

    let mut client = connect(addr).await;
    login(&mut client).await;

    assert_eq!(client.cmd("REST 0").await, "350 Ready for file transfer.");
    assert_eq!(
        client.cmd("REST 3").await,
        "350 Restarting at 3. Send STORE or RETRIEVE."
    );

    // The next RETR still starts at offset zero.
    let reply = client.cmd("EPSV").await;
    let port = epsv_port(&reply);
    let mut data = open_data(port).await;
    client.send("RETR data.bin").await;
    assert_eq!(client.read_line().await, "150 Opening data connection.");
    let mut payload = Vec::new();
    data.read_to_end(&mut payload).await.unwrap();
    assert_eq!(payload, b"abcdef");
    assert_eq!(client.read_line().await, "226 Transfer complete");
}

#[tokio::test]
async fn pre_auth_gate_and_unknown_commands() {
    let (addr, _root) = start_server("gate", (41410, 41420), false).await;
    let mut client = connect(addr).await;

    let reply = client.cmd("PWD").await;
    assert!(reply.starts_with("530 Not logged in"), "got: {}", reply);

    let reply = client.cmd("BOGUS things").await;
    assert_eq!(reply, "500 Unknown command. BOGUS things");

    assert_eq!(client.cmd("NOOP").await, "200 NOOP ok.");
    assert_eq!(client.cmd("QUIT").await, "221 Goodbye.");
}

#[tokio::test]
async fn feat_lists_extensions_without_tls() {
    let (addr, _root) = start_server("feat", (41430, 41440), false).await;
    let mut client = connect(addr).await;

    client.send("FEAT").await;
    let lines = client.read_until("211 End").await;
    assert_eq!(lines.first().unwrap(), "211-Features:");
    assert!(lines.contains(&String::from(" UTF8")));
    assert!(lines.contains(&String::from(" MLSD")));
    assert!(lines.contains(&String::from(" EPSV")));
    assert!(lines.contains(&String::from(" MLST type*;size*;modify*;")));
    assert!(!lines.iter().any(|l| l.contains("AUTH TLS")));
}

#[tokio::test]
async fn type_mode_structure_and_prot_parameters() {
    let (addr, _root) = start_server("params", (41450, 41460), false).await;
    let mut client = connect(addr).await;
    login(&mut client).await;

    assert_eq!(client.cmd("TYPE A").await, "200 Type set to A");
    assert_eq!(client.cmd("TYPE X").await, "500 Unknown type");
    assert_eq!(client.cmd("MODE S").await, "200 Mode set to S.");
    assert_eq!(client.cmd("MODE B").await, "504 Unsupported mode.");
    assert_eq!(client.cmd("STRU F").await, "200 Structure set to F.");
    assert_eq!(client.cmd("STRU R").await, "504 Structure R not implemented.");
    assert_eq!(client.cmd("PBSZ 0").await, "200 PBSZ set to 0.");
    assert_eq!(
        client.cmd("OPTS UTF8 ON").await,
        "200 Always in UTF8 mode."
    );
    assert_eq!(client.cmd("OPTS MLST size").await, "500 Unknown option.");
}

#[tokio::test]
async fn mlsd_lists_the_working_directory() {
    let (addr, root) = start_server("mlsd", (41470, 41500), false).await;
    std::fs::write(root.join("a.txt"), b"aaaa").unwrap();
    std::fs::create_dir(root.join("subdir")).unwrap();

    let mut client = connect(addr).await;
    login(&mut client).await;

    let reply = client.cmd("EPSV").await;
    let port = epsv_port(&reply);
    let mut data = open_data(port).await;
    client.send("MLSD").await;
    assert_eq!(
        client.read_line().await,
        "150 Here comes the directory listing."
    );
    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    assert_eq!(client.read_line().await, "226 Directory send OK.");

    assert!(listing.contains("Type=file;Size=4;"));
    assert!(listing.contains("; a.txt\r\n"));
    assert!(listing.contains("Type=dir;"));
    assert!(listing.contains("; subdir\r\n"));

    // MLST for a single entry goes over the control connection.
    client.send("MLST a.txt").await;
    let lines = client.read_until("250 End").await;
    assert_eq!(lines.first().unwrap(), "250-File details:");
    assert!(lines[1].contains("Type=file;Size=4;"));
}

#[tokio::test]
async fn ascii_type_normalizes_uploaded_line_endings() {
    let (addr, root) = start_server("ascii", (41510, 41520), false).await;
    let mut client = connect(addr).await;
    login(&mut client).await;

    assert_eq!(client.cmd("TYPE A").await, "200 Type set to A");

    let reply = client.cmd("EPSV").await;
    let port = epsv_port(&reply);
    let mut data = open_data(port).await;
    client.send("STOR crlf.txt").await;
    assert_eq!(client.read_line().await, "150 Opening data connection.");
    data.write_all(b"one\r\ntwo\r\n").await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    assert_eq!(client.read_line().await, "226 Transfer complete");

    let stored = std::fs::read(root.join("crlf.txt")).unwrap();
    assert_eq!(stored, b"one\ntwo\n");
}

#[tokio::test]
async fn directory_commands() {
    let (addr, root) = start_server("dirs", (41530, 41540), false).await;
    let mut client = connect(addr).await;
    login(&mut client).await;

    assert_eq!(client.cmd("MKD box/inner").await, "257 \"box/inner\" created.");
    assert!(root.join("box/inner").is_dir());

    let reply = client.cmd("CWD box/inner").await;
    assert_eq!(
        reply,
        "250 Directory successfully changed to \"/box/inner\""
    );
    assert_eq!(
        client.cmd("PWD").await,
        "257 \"/box/inner\" is current directory"
    );

    assert_eq!(
        client.cmd("CDUP").await,
        "250 Directory successfully changed to \"/box\""
    );

    assert_eq!(client.cmd("RMD inner").await, "250 Directory removed.");
    assert!(!root.join("box/inner").exists());

    let reply = client.cmd("CWD missing").await;
    assert!(reply.starts_with("550 Error:"), "got: {}", reply);
}

#[tokio::test]
async fn passive_range_exhaustion_keeps_the_session_alive() {
    // Occupy a port, then hand the server a single-port passive range.
    let blocker = tokio::net::TcpListener::bind("0.0.0.0:0").await.unwrap();
    let port = blocker.local_addr().unwrap().port();

    let (addr, _root) = start_server("exhaust", (port, port), false).await;
    let mut client = connect(addr).await;
    login(&mut client).await;

    let reply = client.cmd("EPSV").await;
    assert!(reply.starts_with("500"), "got: {}", reply);

    assert_eq!(client.cmd("NOOP").await, "200 NOOP ok.");
    drop(blocker);
}

#[tokio::test]
async fn abor_resets_the_data_channel() {
    let (addr, _root) = start_server("abor", (41550, 41560), false).await;
    let mut client = connect(addr).await;
    login(&mut client).await;

    let reply = client.cmd("EPSV").await;
    let _port = epsv_port(&reply);
    assert_eq!(client.cmd("ABOR").await, "226 ABOR command successful.");

    // With the channel back to idle a transfer has nothing to accept.
    client.send("RETR nothing.txt").await;
    assert_eq!(client.read_line().await, "150 Opening data connection.");
    assert_eq!(client.read_line().await, "425 Can't open data connection.");
}

#[tokio::test]
async fn mdtm_stat_and_two_argument_form() {
    let (addr, root) = start_server("mdtm", (41570, 41580), false).await;
    std::fs::write(root.join("clock.txt"), b"tick").unwrap();

    let mut client = connect(addr).await;
    login(&mut client).await;

    let reply = client.cmd("MDTM 20210304050607 clock.txt").await;
    assert_eq!(reply, "213 File modification time set to: 20210304050607");

    let reply = client.cmd("MDTM clock.txt").await;
    assert!(reply.starts_with("213 Type=file;Size=4;Modify=20210304050607"));

    let reply = client.cmd("MDTM nonsense clock.txt").await;
    assert!(reply.starts_with("501 Invalid time format"), "got: {}", reply);
}

#[tokio::test]
async fn fifty_concurrent_sessions_transfer_distinct_files() {
    let (addr, _root) = start_server("many", (41600, 41900), false).await;

    let mut tasks = Vec::new();
    for i in 0..50u32 {
        tasks.push(tokio::spawn(async move {
            let mut client = connect(addr).await;
            login(&mut client).await;
            assert_eq!(client.cmd("TYPE I").await, "200 Type set to I");

            let payload: Vec<u8> = (0..4096u32).map(|j| ((i + j) % 251) as u8).collect();
            let name = format!("file-{:02}.bin", i);

            let reply = client.cmd("EPSV").await;
            let port = epsv_port(&reply);
            let mut data = open_data(port).await;
            client.send(&format!("STOR {}", name)).await;
            assert_eq!(client.read_line().await, "150 Opening data connection.");
            data.write_all(&payload).await.unwrap();
            data.shutdown().await.unwrap();
            drop(data);
            assert_eq!(client.read_line().await, "226 Transfer complete");

            let reply = client.cmd("EPSV").await;
            let port = epsv_port(&reply);
            let mut data = open_data(port).await;
            client.send(&format!("RETR {}", name)).await;
            assert_eq!(client.read_line().await, "150 Opening data connection.");
            let mut echoed = Vec::new();
            data.read_to_end(&mut echoed).await.unwrap();
            assert_eq!(client.read_line().await, "226 Transfer complete");
            assert_eq!(echoed, payload, "data interleaved for session {}", i);

            assert_eq!(client.cmd("QUIT").await, "221 Goodbye.");
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }
}
