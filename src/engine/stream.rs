use cpal::{
    traits::DeviceTrait, FromSample, OutputCallbackInfo, Sample, SizedSample, Stream, StreamConfig,
};
use tracing::error;

use crate::{error::EngineError, synth::PolySynth, MAX_BLOCK_SIZE};

/// Build an output stream that renders `synth` into samples of type `T`.
///
/// The callback renders mono blocks of at most [`MAX_BLOCK_SIZE`] frames and
/// copies each frame to every output channel.
pub(crate) fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut synth: PolySynth,
) -> Result<Stream, EngineError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &OutputCallbackInfo| {
                write_interleaved(&mut synth, &mut render_buf, data, channels);
            },
            |err| error!(%err, "audio stream error"),
            None,
        )
        .map_err(|e| EngineError::BuildStream(e.to_string()))
}

/// Fill an interleaved device buffer from the synth.
fn write_interleaved<T>(
    synth: &mut PolySynth,
    render_buf: &mut [f32],
    data: &mut [T],
    channels: usize,
) where
    T: Sample + FromSample<f32>,
{
    let channels = channels.max(1);
    let total_frames = data.len() / channels;
    let mut frames_written = 0;

    while frames_written < total_frames {
        let frames = (total_frames - frames_written).min(render_buf.len());
        let block = &mut render_buf[..frames];
        synth.render_block(block);

        let start = frames_written * channels;
        let out = &mut data[start..start + frames * channels];
        for (frame, &s) in out.chunks_exact_mut(channels).zip(block.iter()) {
            let value = T::from_sample(s);
            frame.fill(value);
        }

        frames_written += frames;
    }
}
