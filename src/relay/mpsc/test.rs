#[cfg(test)]
mod tests {
    use crate::config::RelayConfig;
    use crate::relay::mpsc::MpscRelay;
    use crate::response::Response;
    use tokio::sync::mpsc::Receiver;
    use tokio::time::Duration;

    async fn recv(rx: &mut Receiver<Response>) -> Response {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for a response")
            .expect("response channel closed")
    }

    #[tokio::test]
    async fn test_mpsc_relay_uses_config() {
        let relay = MpscRelay::new(RelayConfig::default().with_history_limit(2));
        assert_eq!(relay.relay().config().history_limit, 2);

        let (tx, mut rx) = relay.connect(16);
        tx.send(r#"{"type":"join","payload":{"roomId":"r"}}"#.to_string())
            .await
            .unwrap();
        assert_eq!(recv(&mut rx).await, Response::History(Vec::new()));
        assert_eq!(recv(&mut rx).await, Response::system("Joined room r"));

        for text in ["a", "b", "c"] {
            let frame = format!(r#"{{"type":"message","payload":{{"text":"{}"}}}}"#, text);
            tx.send(frame).await.unwrap();
            recv(&mut rx).await;
        }

        let history = relay.relay().registry().history("r").await.unwrap();
        let texts: Vec<String> = history.into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_each_connection_gets_its_own_client() {
        let relay = MpscRelay::default();

        let (tx1, mut rx1) = relay.connect(16);
        let (tx2, mut rx2) = relay.connect(16);
        for tx in [&tx1, &tx2] {
            tx.send(r#"{"type":"join","payload":{"roomId":"pair"}}"#.to_string())
                .await
                .unwrap();
        }
        recv(&mut rx1).await;
        recv(&mut rx2).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(
            relay.relay().registry().member_count("pair").await,
            Some(2)
        );
    }
}
