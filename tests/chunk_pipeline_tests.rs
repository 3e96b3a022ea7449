// End-to-end properties of the capture pipeline: callback-sized frames in,
// uniform ordered chunks out, bounded-latency stop.

use tokio::sync::mpsc;

use voicebridge::{
    chunk_capacity, CaptureWorker, FrameStatus, WorkerChannels, WorkerCommand,
};

fn pipeline(
    sample_rate: u32,
    queue: usize,
) -> (
    CaptureWorker,
    mpsc::Sender<WorkerCommand>,
    mpsc::Receiver<voicebridge::AudioChunk>,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel(4);
    let (chunk_tx, chunk_rx) = mpsc::channel(queue);
    let worker = CaptureWorker::new(
        sample_rate,
        WorkerChannels {
            commands: cmd_rx,
            chunks: chunk_tx,
        },
    );
    (worker, cmd_tx, chunk_rx)
}

#[test]
fn test_frame_size_is_independent_of_chunk_size() {
    // 128-sample frames, the usual callback granularity, against a rate
    // whose chunk size is not a multiple of the frame size
    let rate = 44100;
    let capacity = chunk_capacity(rate);
    let (mut worker, _cmd, mut chunks) = pipeline(rate, 8);

    let frame = vec![0.25f32; 128];
    let total_frames = (capacity * 2) / 128 + 1;
    for _ in 0..total_frames {
        assert_eq!(worker.on_frame(&frame), FrameStatus::Continue);
    }

    let first = chunks.try_recv().expect("first chunk");
    let second = chunks.try_recv().expect("second chunk");
    assert_eq!(first.len(), capacity);
    assert_eq!(second.len(), capacity);
}

#[test]
fn test_chunks_arrive_in_emission_order() {
    let rate = 8000;
    let capacity = chunk_capacity(rate);
    let (mut worker, _cmd, mut chunks) = pipeline(rate, 8);

    // Tag each half-second of audio with a distinct level
    for tag in 1..=3i32 {
        let level = tag as f32 / 10.0;
        worker.on_frame(&vec![level; capacity]);
    }

    let mut previous = 0i16;
    for _ in 0..3 {
        let chunk = chunks.try_recv().expect("chunk");
        let level = chunk.samples()[0];
        assert!(level > previous, "chunks out of order");
        previous = level;
    }
}

#[test]
fn test_stop_takes_effect_on_the_next_frame() {
    let (mut worker, cmd, mut chunks) = pipeline(8000, 8);

    worker.on_frame(&vec![0.5f32; 1000]);
    cmd.try_send(WorkerCommand::Stop).unwrap();

    // The very next callback observes the stop; the partial buffer is
    // released, never emitted
    assert_eq!(worker.on_frame(&vec![0.5f32; 1000]), FrameStatus::Stop);
    assert!(!worker.is_active());
    assert!(chunks.try_recv().is_err(), "partial buffer must not leak");
}

#[test]
fn test_conversion_happens_per_sample_at_any_rate() {
    for rate in [16000u32, 44100] {
        let capacity = chunk_capacity(rate);
        let (mut worker, _cmd, mut chunks) = pipeline(rate, 4);

        worker.on_frame(&vec![1.0f32; capacity]);

        let chunk = chunks.try_recv().expect("chunk");
        assert_eq!(chunk.len(), capacity);
        assert!(chunk.samples().iter().all(|&s| s == 32767));
    }
}
