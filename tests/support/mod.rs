use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot::{self, Sender};
use trestle::{Router, Server};

pub struct Serve {
    addr: SocketAddr,
    tx: Sender<()>,
    handle: tokio::task::JoinHandle<Result<(), trestle::Error>>,
}

impl Serve {
    /// Sends a bodiless HTTP/1.1 request and returns the raw response text.
    pub async fn send(&self, method: &str, path: &str) -> String {
        let mut stream = TcpStream::connect(self.addr).await.unwrap();
        let head = format!("{method} {path} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n");
        stream.write_all(head.as_bytes()).await.unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        String::from_utf8_lossy(&raw).into_owned()
    }

    pub async fn shutdown(self) {
        self.tx.send(()).unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

pub async fn serve(router: Router) -> Serve {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        Server::from_listener(listener)
            .serve_with_shutdown(router, async {
                let _ = rx.await;
            })
            .await
    });

    Serve { addr, tx, handle }
}
